use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewNote, Note};
use crate::page::{Page, PageRequest};

/// Persists and retrieves notes.
pub trait NoteStore: Send + Sync + Clone {
    /// Insert a new note with version 1.
    fn insert(&self, note: &NewNote) -> impl Future<Output = Result<Note, AppError>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<Note>, AppError>> + Send;

    /// Fetch one page of notes together with the total count.
    fn find_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<Note>, AppError>> + Send;

    /// Replace the content of a note if its stored version equals `expected_version`.
    ///
    /// On success the version is incremented and `last_modified_at` refreshed.
    /// Returns `None` when no note matched both id and version.
    fn update_content(
        &self,
        id: Uuid,
        content: &str,
        expected_version: i64,
    ) -> impl Future<Output = Result<Option<Note>, AppError>> + Send;

    /// Delete a note, returning it if it existed.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<Option<Note>, AppError>> + Send;

    /// Check store connectivity.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}
