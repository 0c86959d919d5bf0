//! Hand-rolled joins composing engine reads into the denormalized
//! views the UI renders.
//!
//! There is no query engine underneath, so every composition is an
//! explicit named method with its join and sort rules spelled out.
//! Rows whose foreign keys resolve to nothing are dropped silently;
//! the only placeholder ever substituted is the comment author.

use anyhow::Result;
use corkboard_types::{
    ActivityLog, Board, BoardDetail, BoardMember, BoardOverview, Card, CardAssignee, CardDetail,
    CardLabel, ChecklistItem, Comment, CommentAuthor, CommentView, Label, List, MemberProfile,
    NewActivityLog, User,
};

use crate::Store;
use crate::engine::by;

impl Store {
    fn display_name(&self, user_id: i64) -> Result<String> {
        Ok(self
            .get::<User>(user_id)?
            .map(|user| user.display_name())
            .unwrap_or_else(|| "Unknown".to_string()))
    }

    /// Memberships of a board resolved to user profiles. Memberships
    /// pointing at deleted users are dropped.
    fn board_roster(&self, board_id: i64) -> Result<Vec<MemberProfile>> {
        let mut roster = Vec::new();
        for membership in self.list_where::<BoardMember>(&by("board_id", board_id))? {
            if let Some(user) = self.get::<User>(membership.user_id)? {
                roster.push(MemberProfile {
                    user,
                    role: membership.role,
                });
            }
        }
        Ok(roster)
    }

    /// Boards the user is a member of, with roster and list/card tallies.
    /// Starred boards come first, then most recently updated; ties keep
    /// their stored order.
    pub fn boards_for_user(&self, user_id: i64) -> Result<Vec<BoardOverview>> {
        let memberships = self.list_where::<BoardMember>(&by("user_id", user_id))?;
        let mut overviews = Vec::new();
        for membership in memberships {
            let Some(board) = self.get::<Board>(membership.board_id)? else {
                continue;
            };
            let members = self.board_roster(board.id)?;
            let lists = self.list_where::<List>(&by("board_id", board.id))?;
            let mut card_count = 0;
            for list in &lists {
                card_count += self.find_by("cards", &by("list_id", list.id))?.len();
            }
            let created_by_name = self.display_name(board.created_by)?;
            overviews.push(BoardOverview {
                members,
                list_count: lists.len(),
                card_count,
                created_by_name,
                board,
            });
        }
        overviews.sort_by(|a, b| {
            b.board
                .is_starred
                .cmp(&a.board.is_starred)
                .then_with(|| b.board.updated_at.cmp(&a.board.updated_at))
        });
        Ok(overviews)
    }

    /// One board with its lists in display order. Requires a membership
    /// row for `user_id`; a missing board and a missing membership both
    /// come back as `None`, indistinguishable on purpose (the UI treats
    /// either as "not yours").
    pub fn board_detail(&self, board_id: i64, user_id: i64) -> Result<Option<BoardDetail>> {
        let mut membership = by("board_id", board_id);
        membership.insert("user_id".to_string(), user_id.into());
        if self.find_by("board_members", &membership)?.is_empty() {
            return Ok(None);
        }
        let Some(board) = self.get::<Board>(board_id)? else {
            return Ok(None);
        };
        let mut lists = self.list_where::<List>(&by("board_id", board_id))?;
        lists.sort_by_key(|list| list.position);
        let created_by_name = self.display_name(board.created_by)?;
        Ok(Some(BoardDetail {
            board,
            lists,
            created_by_name,
        }))
    }

    /// Every card on the board: each list's cards ascending by position,
    /// concatenated list by list in stored list order. No global re-sort.
    pub fn cards_for_board(&self, board_id: i64) -> Result<Vec<Card>> {
        let lists = self.list_where::<List>(&by("board_id", board_id))?;
        let mut cards = Vec::new();
        for list in lists {
            let mut batch = self.list_where::<Card>(&by("list_id", list.id))?;
            batch.sort_by_key(|card| card.position);
            cards.extend(batch);
        }
        Ok(cards)
    }

    /// The full card modal payload: assignees and labels with dangling
    /// references dropped, checklist ascending by position, comments
    /// newest first with a placeholder author when the user is gone,
    /// attachments in stored order.
    pub fn card_detail(&self, card_id: i64) -> Result<Option<CardDetail>> {
        let Some(card) = self.get::<Card>(card_id)? else {
            return Ok(None);
        };

        let mut assignees = Vec::new();
        for link in self.list_where::<CardAssignee>(&by("card_id", card_id))? {
            if let Some(user) = self.get::<User>(link.user_id)? {
                assignees.push(user);
            }
        }

        let mut labels = Vec::new();
        for link in self.list_where::<CardLabel>(&by("card_id", card_id))? {
            if let Some(label) = self.get::<Label>(link.label_id)? {
                labels.push(label);
            }
        }

        let mut checklist = self.list_where::<ChecklistItem>(&by("card_id", card_id))?;
        checklist.sort_by_key(|item| item.position);

        let mut raw_comments = self.list_where::<Comment>(&by("card_id", card_id))?;
        raw_comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut comments = Vec::new();
        for comment in raw_comments {
            let author = match self.get::<User>(comment.user_id)? {
                Some(user) => CommentAuthor::from(&user),
                None => CommentAuthor::unknown(),
            };
            comments.push(CommentView { comment, author });
        }

        let attachments = self.list_where(&by("card_id", card_id))?;

        Ok(Some(CardDetail {
            card,
            assignees,
            labels,
            checklist,
            comments,
            attachments,
        }))
    }

    /// Appends one activity row. Foreign ids are recorded as given,
    /// never validated.
    pub fn log_activity(
        &self,
        user_id: i64,
        action: &str,
        board_id: Option<i64>,
        card_id: Option<i64>,
        details: Option<String>,
    ) -> Result<ActivityLog> {
        self.create(&NewActivityLog {
            user_id,
            board_id,
            card_id,
            action: action.to_string(),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Record;
    use crate::{Store, StoreConfig, by};
    use corkboard_types::{
        BoardRole, NewBoard, NewBoardMember, NewCard, NewCardAssignee, NewCardLabel,
        NewChecklistItem, NewLabel, NewList, NewUser, Visibility,
    };
    use serde_json::json;

    fn empty_store() -> Store {
        Store::open_in_memory(StoreConfig::new("unused.db").namespace("test").seed_demo(false))
            .unwrap()
    }

    fn draft_user(first: &str, last: &str) -> NewUser {
        NewUser {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            password: "mock$secret".to_string(),
            avatar: "XX".to_string(),
            avatar_color: "#0079bf".to_string(),
            last_login: None,
            is_active: true,
        }
    }

    fn draft_board(title: &str, created_by: i64) -> NewBoard {
        NewBoard {
            title: title.to_string(),
            description: String::new(),
            background_color: "#0079bf".to_string(),
            background_image: None,
            visibility: Visibility::Private,
            is_starred: false,
            created_by,
        }
    }

    fn draft_card(list_id: i64, title: &str, position: i64) -> NewCard {
        NewCard {
            list_id,
            title: title.to_string(),
            description: String::new(),
            position,
            due_date: None,
            is_completed: false,
            created_by: 1,
        }
    }

    fn board_row(id: i64, starred: bool, updated_at: &str) -> Record {
        json!({
            "id": id,
            "title": format!("B{id}"),
            "description": "",
            "background_color": "#0079bf",
            "background_image": null,
            "visibility": "private",
            "is_starred": starred,
            "created_by": 1,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": updated_at,
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn fresh_board_overview_counts_and_roster() {
        let store = empty_store();
        let user = store.create(&draft_user("Ada", "Li")).unwrap();
        let board = store.create(&draft_board("T", user.id)).unwrap();
        store
            .create(&NewBoardMember {
                board_id: board.id,
                user_id: user.id,
                role: BoardRole::Owner,
            })
            .unwrap();

        let overviews = store.boards_for_user(user.id).unwrap();
        assert_eq!(overviews.len(), 1);
        let overview = &overviews[0];
        assert_eq!(overview.board.id, 1);
        assert_eq!(overview.list_count, 0);
        assert_eq!(overview.card_count, 0);
        assert_eq!(overview.created_by_name, "Ada Li");
        assert_eq!(overview.members.len(), 1);
        assert_eq!(overview.members[0].role, BoardRole::Owner);
        assert_eq!(overview.members[0].user.id, user.id);
    }

    #[test]
    fn board_listing_puts_starred_first_then_most_recent() {
        let store = empty_store();
        store.create(&draft_user("Ada", "Li")).unwrap();
        store
            .save_records(
                "boards",
                &[
                    board_row(1, true, "2026-02-01T00:00:00Z"),
                    board_row(2, false, "2026-03-01T00:00:00Z"),
                    board_row(3, true, "2026-01-01T00:00:00Z"),
                ],
            )
            .unwrap();
        for board_id in 1..=3 {
            store
                .create(&NewBoardMember {
                    board_id,
                    user_id: 1,
                    role: BoardRole::Member,
                })
                .unwrap();
        }

        let overviews = store.boards_for_user(1).unwrap();
        let ids: Vec<_> = overviews.iter().map(|o| o.board.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn membership_to_a_deleted_board_is_skipped() {
        let store = empty_store();
        let user = store.create(&draft_user("Ada", "Li")).unwrap();
        store
            .create(&NewBoardMember {
                board_id: 99,
                user_id: user.id,
                role: BoardRole::Owner,
            })
            .unwrap();
        assert!(store.boards_for_user(user.id).unwrap().is_empty());
    }

    #[test]
    fn roster_drops_memberships_of_deleted_users() {
        let store = empty_store();
        let owner = store.create(&draft_user("Ada", "Li")).unwrap();
        let gone = store.create(&draft_user("Max", "Webb")).unwrap();
        let board = store.create(&draft_board("T", owner.id)).unwrap();
        for (user_id, role) in [(owner.id, BoardRole::Owner), (gone.id, BoardRole::Member)] {
            store
                .create(&NewBoardMember {
                    board_id: board.id,
                    user_id,
                    role,
                })
                .unwrap();
        }
        store.delete("users", gone.id).unwrap();

        let overviews = store.boards_for_user(owner.id).unwrap();
        assert_eq!(overviews[0].members.len(), 1);
        assert_eq!(overviews[0].members[0].user.id, owner.id);
    }

    #[test]
    fn board_detail_needs_membership_and_a_live_board() {
        let store = empty_store();
        let user = store.create(&draft_user("Ada", "Li")).unwrap();
        let board = store.create(&draft_board("T", user.id)).unwrap();

        // no membership row yet
        assert!(store.board_detail(board.id, user.id).unwrap().is_none());

        store
            .create(&NewBoardMember {
                board_id: board.id,
                user_id: user.id,
                role: BoardRole::Owner,
            })
            .unwrap();
        store
            .create(&NewList {
                board_id: board.id,
                title: "Second".to_string(),
                position: 2,
            })
            .unwrap();
        store
            .create(&NewList {
                board_id: board.id,
                title: "First".to_string(),
                position: 1,
            })
            .unwrap();

        let detail = store.board_detail(board.id, user.id).unwrap().unwrap();
        let titles: Vec<_> = detail.lists.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(detail.created_by_name, "Ada Li");

        // membership pointing at a board that is gone
        store.delete("boards", board.id).unwrap();
        assert!(store.board_detail(board.id, user.id).unwrap().is_none());
    }

    #[test]
    fn board_cards_come_per_list_in_position_order() {
        let store = empty_store();
        store.create(&draft_user("Ada", "Li")).unwrap();
        let board = store.create(&draft_board("T", 1)).unwrap();
        let todo = store
            .create(&NewList {
                board_id: board.id,
                title: "Todo".to_string(),
                position: 1,
            })
            .unwrap();
        let done = store
            .create(&NewList {
                board_id: board.id,
                title: "Done".to_string(),
                position: 2,
            })
            .unwrap();
        store.create(&draft_card(todo.id, "t2", 2)).unwrap();
        store.create(&draft_card(done.id, "d1", 1)).unwrap();
        store.create(&draft_card(todo.id, "t1", 1)).unwrap();

        let titles: Vec<_> = store
            .cards_for_board(board.id)
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["t1", "t2", "d1"]);
    }

    #[test]
    fn card_detail_tolerates_dangling_joins() {
        let store = empty_store();
        let ada = store.create(&draft_user("Ada", "Li")).unwrap();
        let gone = store.create(&draft_user("Max", "Webb")).unwrap();
        let card = store.create(&draft_card(1, "Ship it", 1)).unwrap();

        for user_id in [ada.id, gone.id] {
            store
                .create(&NewCardAssignee {
                    card_id: card.id,
                    user_id,
                })
                .unwrap();
        }
        let label = store
            .create(&NewLabel {
                board_id: 1,
                name: "Bug".to_string(),
                color: "#eb5a46".to_string(),
            })
            .unwrap();
        store
            .create(&NewCardLabel {
                card_id: card.id,
                label_id: label.id,
            })
            .unwrap();
        store
            .create(&NewCardLabel {
                card_id: card.id,
                label_id: 77,
            })
            .unwrap();
        store.delete("users", gone.id).unwrap();

        let detail = store.card_detail(card.id).unwrap().unwrap();
        // deleted assignee is dropped, not replaced by a placeholder
        assert_eq!(detail.assignees.len(), 1);
        assert_eq!(detail.assignees[0].id, ada.id);
        assert_eq!(detail.labels.len(), 1);
        assert_eq!(detail.labels[0].name, "Bug");
    }

    #[test]
    fn card_detail_orders_checklist_and_comments() {
        let store = empty_store();
        let ada = store.create(&draft_user("Ada", "Li")).unwrap();
        let card = store.create(&draft_card(1, "Ship it", 1)).unwrap();
        store
            .create(&NewChecklistItem {
                card_id: card.id,
                text: "second".to_string(),
                is_done: false,
                position: 2,
            })
            .unwrap();
        store
            .create(&NewChecklistItem {
                card_id: card.id,
                text: "first".to_string(),
                is_done: true,
                position: 1,
            })
            .unwrap();

        let comment_row = |id: i64, user_id: i64, text: &str, at: &str| {
            json!({
                "id": id,
                "card_id": card.id,
                "user_id": user_id,
                "text": text,
                "created_at": at,
                "updated_at": at,
            })
            .as_object()
            .unwrap()
            .clone()
        };
        store
            .save_records(
                "comments",
                &[
                    comment_row(1, ada.id, "older", "2026-01-01T00:00:00Z"),
                    comment_row(2, 42, "newer", "2026-02-01T00:00:00Z"),
                ],
            )
            .unwrap();

        let detail = store.card_detail(card.id).unwrap().unwrap();
        let texts: Vec<_> = detail.checklist.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        // newest first; the missing author becomes the placeholder
        assert_eq!(detail.comments[0].comment.text, "newer");
        assert_eq!(detail.comments[0].author.first_name, "Unknown");
        assert_eq!(detail.comments[0].author.avatar, "?");
        assert_eq!(detail.comments[0].author.avatar_color, "#666");
        assert_eq!(detail.comments[1].author.first_name, "Ada");
    }

    #[test]
    fn activity_is_appended_verbatim() {
        let store = empty_store();
        let entry = store
            .log_activity(7, "card_moved", Some(3), Some(12), Some("to Done".to_string()))
            .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.user_id, 7);
        assert_eq!(entry.board_id, Some(3));
        assert_eq!(entry.details.as_deref(), Some("to Done"));

        let rows = store.find_by("activity_log", &by("action", "card_moved")).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
