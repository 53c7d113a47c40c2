use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notes_core::models::Note;
use notes_core::page::Page;
use notes_core::validation::{Validate, Violation, no_nul, not_blank, positive};

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteDto {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub last_modified_at: i64,
    pub version: i64,
}

impl From<Note> for NoteDto {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            username: note.username,
            content: note.content,
            created_at: note.created_at.timestamp_millis(),
            last_modified_at: note.last_modified_at.timestamp_millis(),
            version: note.version,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SaveNoteRequest {
    /// Note text; must not be blank
    #[serde(default)]
    pub content: Option<String>,
}

impl Validate for SaveNoteRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            not_blank("content", self.content.as_deref()),
            no_nul("content", self.content.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteResponse {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub version: i64,
}

impl From<Note> for SaveNoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            username: note.username,
            content: note.content,
            created_at: note.created_at.timestamp_millis(),
            version: note.version,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateNoteRequest {
    /// New note text; must not be blank
    #[serde(default)]
    pub content: Option<String>,
    /// Version the client last saw; must be greater than 0
    #[serde(default)]
    pub version: Option<i64>,
}

impl Validate for UpdateNoteRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            not_blank("content", self.content.as_deref()),
            no_nul("content", self.content.as_deref()),
            positive("version", self.version.unwrap_or_default()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index (default 0)
    pub page: Option<i64>,
    /// Page size (default 20)
    pub size: Option<i64>,
    /// Sort as `property[,asc|desc]`, e.g. `createdAt,desc`
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotePageResponse {
    pub content: Vec<NoteDto>,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl From<Page<Note>> for NotePageResponse {
    fn from(page: Page<Note>) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let page = page.map(NoteDto::from);
        Self {
            number_of_elements: page.number_of_elements(),
            empty: page.is_empty(),
            content: page.content,
            number: page.number,
            size: page.size,
            total_elements: page.total_elements,
            total_pages,
            first,
            last,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ViolationResponse {
    pub field: String,
    pub message: String,
}

impl From<Violation> for ViolationResponse {
    fn from(v: Violation) -> Self {
        Self {
            field: v.field,
            message: v.message,
        }
    }
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorMessage {
    /// RFC 3339 timestamp with the server's local offset
    pub timestamp: String,
    pub status: u16,
    pub errors: Vec<ViolationResponse>,
}

impl ErrorMessage {
    pub fn new(status: StatusCode, mut violations: Vec<Violation>) -> Self {
        violations.sort();
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            status: status.as_u16(),
            errors: violations.into_iter().map(Into::into).collect(),
        }
    }
}
