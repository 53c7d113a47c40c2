//! Test utilities: an in-memory [`NoteStore`] mock.
//!
//! Uses `Arc<Mutex<_>>` for interior mutability so tests can inspect
//! stored notes and inject failures.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewNote, Note};
use crate::page::{Direction, Page, PageRequest, SortProperty};
use crate::traits::NoteStore;

/// In-memory store keeping notes in insertion order.
#[derive(Clone, Default)]
pub struct MockStore {
    pub notes: Arc<Mutex<Vec<Note>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store whose next operation fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            notes: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    /// Overwrite a stored note directly, bypassing version checks.
    pub fn put(&self, note: Note) {
        let mut notes = self.notes.lock().unwrap();
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => notes.push(note),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_error(&self) -> Result<(), AppError> {
        match self.error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl NoteStore for MockStore {
    async fn insert(&self, note: &NewNote) -> Result<Note, AppError> {
        self.take_error()?;
        let stored = Note {
            id: note.id,
            username: note.username.clone(),
            content: note.content.clone(),
            created_at: note.created_at,
            last_modified_at: note.created_at,
            version: 1,
        };
        self.notes.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        self.take_error()?;
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Note>, AppError> {
        self.take_error()?;
        let mut all = self.notes.lock().unwrap().clone();
        if let Some(sort) = request.sort {
            all.sort_by(|a, b| {
                let ord = match sort.property {
                    SortProperty::Id => a.id.cmp(&b.id),
                    SortProperty::Username => a.username.cmp(&b.username),
                    SortProperty::Content => a.content.cmp(&b.content),
                    SortProperty::CreatedAt => a.created_at.cmp(&b.created_at),
                    SortProperty::LastModifiedAt => a.last_modified_at.cmp(&b.last_modified_at),
                    SortProperty::Version => a.version.cmp(&b.version),
                };
                match sort.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        let total = all.len() as u64;
        let content = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.size as usize)
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        expected_version: i64,
    ) -> Result<Option<Note>, AppError> {
        self.take_error()?;
        let mut notes = self.notes.lock().unwrap();
        let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == id && n.version == expected_version)
        else {
            return Ok(None);
        };
        note.content = content.to_string();
        note.version += 1;
        note.last_modified_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        self.take_error()?;
        let mut notes = self.notes.lock().unwrap();
        let removed = notes
            .iter()
            .position(|n| n.id == id)
            .map(|idx| notes.remove(idx));
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.take_error()
    }
}
