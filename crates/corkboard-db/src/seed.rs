//! First-run bootstrap.
//!
//! On open, every known table and sequence key is created, and a sample
//! workspace is seeded exactly once (guarded by the init marker). The
//! seed order matters: later steps reference ids handed out by earlier
//! ones, starting from a fresh sequence on every table.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use corkboard_types::{
    BoardRole, Draft, NewBoard, NewBoardMember, NewCard, NewCardAssignee, NewLabel, NewList,
    NewUser, Table, Visibility,
};
use rusqlite::Connection;
use serde_json::Value;
use tracing::{debug, info};

use crate::{Store, TABLES, engine, kv};

impl Store {
    pub(crate) fn bootstrap(&self, seed_demo: bool) -> Result<()> {
        self.with_conn(|conn| {
            let namespace = &self.namespace;
            if kv::get(conn, &kv::init_key(namespace))?.as_deref() == Some("true") {
                return Ok(());
            }

            for table in TABLES {
                if kv::get(conn, &kv::table_key(namespace, table))?.is_none() {
                    kv::save(conn, namespace, table, &[])?;
                }
                if kv::get(conn, &kv::sequence_key(namespace, table))?.is_none() {
                    kv::put(conn, &kv::sequence_key(namespace, table), "1")?;
                }
            }

            if seed_demo {
                seed_demo_rows(conn, namespace)?;
            }

            kv::put(conn, &kv::init_key(namespace), "true")?;
            info!("store bootstrap complete (seeded: {seed_demo})");
            Ok(())
        })
    }
}

fn insert_draft<D: Draft>(conn: &Connection, namespace: &str, draft: &D) -> Result<i64> {
    let Value::Object(fields) = serde_json::to_value(draft)? else {
        anyhow::bail!("draft for {} did not serialize to an object", D::Entity::NAME);
    };
    let record = engine::insert_tx(conn, namespace, D::Entity::NAME, fields)?;
    engine::record_id(&record).context("seeded record has no id")
}

fn seed_demo_rows(conn: &Connection, namespace: &str) -> Result<()> {
    let user = |first: &str, last: &str, avatar: &str, color: &str| NewUser {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!(
            "{}.{}@corkboard.dev",
            first.to_lowercase(),
            last.to_lowercase()
        ),
        password: "mock$corkboard".to_string(),
        avatar: avatar.to_string(),
        avatar_color: color.to_string(),
        last_login: None,
        is_active: true,
    };

    let sarah = insert_draft(conn, namespace, &user("Sarah", "Chen", "SC", "#0079bf"))?;
    let marcus = insert_draft(conn, namespace, &user("Marcus", "Webb", "MW", "#61bd4f"))?;
    let priya = insert_draft(conn, namespace, &user("Priya", "Patel", "PP", "#c377e0"))?;
    let diego = insert_draft(conn, namespace, &user("Diego", "Alvarez", "DA", "#ff9f1a"))?;
    debug!("seeded sample users");

    let board = insert_draft(
        conn,
        namespace,
        &NewBoard {
            title: "Product Launch".to_string(),
            description: "Everything needed to get v1 out the door".to_string(),
            background_color: "#0079bf".to_string(),
            background_image: None,
            visibility: Visibility::Workspace,
            is_starred: true,
            created_by: sarah,
        },
    )?;

    for (user_id, role) in [
        (sarah, BoardRole::Owner),
        (marcus, BoardRole::Admin),
        (priya, BoardRole::Member),
        (diego, BoardRole::Member),
    ] {
        insert_draft(
            conn,
            namespace,
            &NewBoardMember {
                board_id: board,
                user_id,
                role,
            },
        )?;
    }
    debug!("seeded sample board and roster");

    let mut lists = Vec::new();
    for (position, title) in ["To Do", "In Progress", "Review", "Done"].iter().enumerate() {
        lists.push(insert_draft(
            conn,
            namespace,
            &NewList {
                board_id: board,
                title: (*title).to_string(),
                position: position as i64 + 1,
            },
        )?);
    }

    let now = Utc::now();
    let cards: [(i64, &str, &str, i64, Option<i64>, bool, i64); 6] = [
        (
            lists[0],
            "Draft landing page copy",
            "Hero, feature grid, pricing blurb",
            1,
            Some(3),
            false,
            priya,
        ),
        (
            lists[0],
            "Set up error reporting",
            "Wire the client into the tracker",
            2,
            None,
            false,
            marcus,
        ),
        (
            lists[1],
            "Implement billing webhooks",
            "Handle invoice.paid and subscription events",
            1,
            Some(5),
            false,
            marcus,
        ),
        (
            lists[1],
            "Design empty states",
            "Boards, lists and search need friendly zeroes",
            2,
            None,
            false,
            priya,
        ),
        (
            lists[2],
            "Onboarding flow walkthrough",
            "Record the happy path end to end",
            1,
            Some(1),
            false,
            sarah,
        ),
        (
            lists[3],
            "Pick a launch date",
            "",
            1,
            None,
            true,
            sarah,
        ),
    ];
    for (list_id, title, description, position, due_days, is_completed, created_by) in cards {
        let card = insert_draft(
            conn,
            namespace,
            &NewCard {
                list_id,
                title: title.to_string(),
                description: description.to_string(),
                position,
                due_date: due_days.map(|days| now + Duration::days(days)),
                is_completed,
                created_by,
            },
        )?;
        // every seeded card starts assigned to its creator
        insert_draft(
            conn,
            namespace,
            &NewCardAssignee {
                card_id: card,
                user_id: created_by,
            },
        )?;
    }
    debug!("seeded sample lists and cards");

    for (name, color) in [
        ("Priority", "#eb5a46"),
        ("Design", "#c377e0"),
        ("Backend", "#0079bf"),
        ("Polish", "#61bd4f"),
    ] {
        insert_draft(
            conn,
            namespace,
            &NewLabel {
                board_id: board,
                name: name.to_string(),
                color: color.to_string(),
            },
        )?;
    }
    debug!("seeded sample labels");

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};

    fn seeded_store() -> Store {
        Store::open_in_memory(StoreConfig::new("unused.db").namespace("test")).unwrap()
    }

    #[test]
    fn second_bootstrap_is_a_no_op() {
        let store = seeded_store();
        let users_before = store.table_records("users").unwrap().len();
        assert!(users_before > 0);

        store.bootstrap(true).unwrap();
        assert_eq!(store.table_records("users").unwrap().len(), users_before);
        assert_eq!(store.table_records("boards").unwrap().len(), 1);
    }

    #[test]
    fn demo_workspace_is_fully_wired() {
        let store = seeded_store();

        let overviews = store.boards_for_user(1).unwrap();
        assert_eq!(overviews.len(), 1);
        let overview = &overviews[0];
        assert_eq!(overview.board.title, "Product Launch");
        assert_eq!(overview.list_count, 4);
        assert_eq!(overview.card_count, 6);
        assert_eq!(overview.members.len(), 4);
        assert_eq!(overview.created_by_name, "Sarah Chen");

        // every member can open the board
        for user_id in 1..=4 {
            assert!(store.board_detail(1, user_id).unwrap().is_some());
        }

        // seeded cards are assigned to their creators
        for card in store.cards_for_board(1).unwrap() {
            let detail = store.card_detail(card.id).unwrap().unwrap();
            assert_eq!(detail.assignees.len(), 1);
            assert_eq!(detail.assignees[0].id, card.created_by);
        }

        assert_eq!(store.table_records("labels").unwrap().len(), 4);
    }
}
