//! Entity record definitions, one struct per storage table.
//!
//! Every stored entity carries an engine-assigned `id` plus
//! `created_at`/`updated_at` stamps. The `New*` drafts are the insert
//! payloads; the storage engine adds the rest. Relations are plain
//! integer foreign keys with no enforced constraints, so readers must
//! treat a key that resolves to nothing as "not found".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ties an entity struct to the name of the table it is stored in.
pub trait Table {
    const NAME: &'static str;
}

/// An insert payload for a [`Table`] entity.
pub trait Draft: Serialize {
    type Entity: Table;
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Mock credential string; never validated by this layer.
    pub password: String,
    /// Display initials, e.g. "SC".
    pub avatar: String,
    pub avatar_color: String,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for User {
    const NAME: &'static str = "users";
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub avatar_color: String,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Draft for NewUser {
    type Entity = User;
}

// -- Boards --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Workspace,
    Public,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub background_color: String,
    pub background_image: Option<String>,
    pub visibility: Visibility,
    pub is_starred: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for Board {
    const NAME: &'static str = "boards";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBoard {
    pub title: String,
    pub description: String,
    pub background_color: String,
    pub background_image: Option<String>,
    pub visibility: Visibility,
    pub is_starred: bool,
    pub created_by: i64,
}

impl Draft for NewBoard {
    type Entity = Board;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    Owner,
    Admin,
    Member,
}

/// Join row granting a user access to a board. The (board_id, user_id)
/// pair is logically unique but nothing enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMember {
    pub id: i64,
    pub board_id: i64,
    pub user_id: i64,
    pub role: BoardRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for BoardMember {
    const NAME: &'static str = "board_members";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBoardMember {
    pub board_id: i64,
    pub user_id: i64,
    pub role: BoardRole,
}

impl Draft for NewBoardMember {
    type Entity = BoardMember;
}

// -- Lists & cards --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub board_id: i64,
    pub title: String,
    /// Display order within the board, ascending. Ties are undefined.
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for List {
    const NAME: &'static str = "lists";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewList {
    pub board_id: i64,
    pub title: String,
    pub position: i64,
}

impl Draft for NewList {
    type Entity = List;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub description: String,
    /// Display order within the list, ascending. Ties are undefined.
    pub position: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for Card {
    const NAME: &'static str = "cards";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    pub list_id: i64,
    pub title: String,
    pub description: String,
    pub position: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_by: i64,
}

impl Draft for NewCard {
    type Entity = Card;
}

// -- Labels --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for Label {
    const NAME: &'static str = "labels";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLabel {
    pub board_id: i64,
    pub name: String,
    pub color: String,
}

impl Draft for NewLabel {
    type Entity = Label;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardLabel {
    pub id: i64,
    pub card_id: i64,
    pub label_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for CardLabel {
    const NAME: &'static str = "card_labels";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCardLabel {
    pub card_id: i64,
    pub label_id: i64,
}

impl Draft for NewCardLabel {
    type Entity = CardLabel;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardAssignee {
    pub id: i64,
    pub card_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for CardAssignee {
    const NAME: &'static str = "card_assignees";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCardAssignee {
    pub card_id: i64,
    pub user_id: i64,
}

impl Draft for NewCardAssignee {
    type Entity = CardAssignee;
}

// -- Card detail children --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: i64,
    pub card_id: i64,
    pub text: String,
    pub is_done: bool,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for ChecklistItem {
    const NAME: &'static str = "checklist_items";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewChecklistItem {
    pub card_id: i64,
    pub text: String,
    pub is_done: bool,
    pub position: i64,
}

impl Draft for NewChecklistItem {
    type Entity = ChecklistItem;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub card_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for Comment {
    const NAME: &'static str = "comments";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub card_id: i64,
    pub user_id: i64,
    pub text: String,
}

impl Draft for NewComment {
    type Entity = Comment;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub card_id: i64,
    pub file_name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for Attachment {
    const NAME: &'static str = "attachments";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAttachment {
    pub card_id: i64,
    pub file_name: String,
    pub url: String,
}

impl Draft for NewAttachment {
    type Entity = Attachment;
}

// -- Activity --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub board_id: Option<i64>,
    pub card_id: Option<i64>,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for ActivityLog {
    const NAME: &'static str = "activity_log";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewActivityLog {
    pub user_id: i64,
    pub board_id: Option<i64>,
    pub card_id: Option<i64>,
    pub action: String,
    pub details: Option<String>,
}

impl Draft for NewActivityLog {
    type Entity = ActivityLog;
}
