//! Denormalized view aggregates returned by the query layer.
//!
//! These are read-time compositions, never stored. They keep the source
//! entity intact instead of flattening fields into one object, so a
//! renderer can reach both the entity and the joined extras.

use serde::{Deserialize, Serialize};

use crate::records::{Attachment, Board, BoardRole, Card, ChecklistItem, Comment, Label, List, User};

/// A board member resolved to its user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub user: User,
    pub role: BoardRole,
}

/// One row of the "your boards" listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardOverview {
    pub board: Board,
    pub members: Vec<MemberProfile>,
    pub list_count: usize,
    pub card_count: usize,
    pub created_by_name: String,
}

/// A single board opened by a member, lists in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    pub board: Board,
    pub lists: Vec<List>,
    pub created_by_name: String,
}

/// Comment author snapshot. Falls back to [`CommentAuthor::unknown`]
/// when the authoring user has been deleted, so old threads still render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub avatar_color: String,
}

impl CommentAuthor {
    pub fn unknown() -> Self {
        Self {
            first_name: "Unknown".to_string(),
            last_name: "User".to_string(),
            avatar: "?".to_string(),
            avatar_color: "#666".to_string(),
        }
    }
}

impl From<&User> for CommentAuthor {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
            avatar_color: user.avatar_color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: CommentAuthor,
}

/// Everything the card modal needs in one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetail {
    pub card: Card,
    pub assignees: Vec<User>,
    pub labels: Vec<Label>,
    pub checklist: Vec<ChecklistItem>,
    pub comments: Vec<CommentView>,
    pub attachments: Vec<Attachment>,
}
