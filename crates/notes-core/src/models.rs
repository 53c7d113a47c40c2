use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Note {
    pub id: Uuid,
    /// Owner of the note; the only user allowed to update it.
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    /// Optimistic-locking counter, starts at 1.
    pub version: i64,
}

impl Note {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.username == username
    }
}

/// DTO for inserting a new note into the store.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewNote {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewNote {
    /// Assigns a time-ordered id and the current timestamp.
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Parse a note id from a path segment.
///
/// Returns `None` for anything that is not a UUID; such ids cannot exist.
pub fn parse_note_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
