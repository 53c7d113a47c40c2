use crate::error::AppError;
use crate::models::{NewNote, Note, parse_note_id};
use crate::page::{Page, PageRequest};
use crate::traits::NoteStore;

/// Note use cases: create, page, find, update with ownership and version
/// checks, remove.
///
/// Generic over the store so it can run against PostgreSQL or an in-memory mock.
pub struct NoteService<S>
where
    S: NoteStore,
{
    store: S,
}

impl<S> NoteService<S>
where
    S: NoteStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a note owned by `username`.
    pub async fn save_note(&self, username: &str, content: &str) -> Result<Note, AppError> {
        tracing::debug!("User [{username}] is trying to save note with content: {content}");
        let saved = self.store.insert(&NewNote::new(username, content)).await?;
        tracing::info!(
            "User [{}] created note [{}] at [{}] with version [{}]",
            saved.username,
            saved.id,
            saved.created_at,
            saved.version
        );
        Ok(saved)
    }

    pub async fn get_page(&self, request: &PageRequest) -> Result<Page<Note>, AppError> {
        tracing::debug!(
            page = request.page,
            size = request.size,
            sort = ?request.sort,
            "Finding page of notes"
        );
        self.store.find_page(request).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Note>, AppError> {
        tracing::debug!("Finding note by id [{id}]");
        let Some(id) = parse_note_id(id) else {
            return Ok(None);
        };
        self.store.find_by_id(id).await
    }

    /// Replace the content of a note owned by `username`.
    ///
    /// `version` must equal the stored version; the stored version is then
    /// incremented. Returns `None` if the note does not exist.
    pub async fn update_note(
        &self,
        username: &str,
        id: &str,
        content: &str,
        version: i64,
    ) -> Result<Option<Note>, AppError> {
        tracing::debug!("User [{username}] is trying to update note [{id}]");

        let Some(note) = self.find_by_id(id).await? else {
            tracing::debug!("Couldn't find note by id [{id}]");
            return Ok(None);
        };

        if !note.is_owned_by(username) {
            return Err(AppError::NotOwner {
                note_id: note.id.to_string(),
                owner: note.username,
                requester: username.to_string(),
            });
        }

        let incorrect_version = || AppError::IncorrectVersion {
            note_id: note.id.to_string(),
            username: username.to_string(),
            version,
        };

        if note.version != version {
            return Err(incorrect_version());
        }

        // A concurrent writer may have bumped the version since the read above.
        let updated = self
            .store
            .update_content(note.id, content, version)
            .await?
            .ok_or_else(incorrect_version)?;

        tracing::info!(
            "User [{}] updated note [{}] with content [{}] at [{}]",
            username,
            updated.id,
            updated.content,
            updated.last_modified_at
        );

        Ok(Some(updated))
    }

    pub async fn remove_note(&self, id: &str) -> Result<Option<Note>, AppError> {
        tracing::info!("Removing note by id [{id}]");
        let Some(parsed) = parse_note_id(id) else {
            tracing::info!("Could not find note by id [{id}] in order to remove it");
            return Ok(None);
        };
        let removed = self.store.delete(parsed).await?;
        match &removed {
            Some(note) => tracing::info!("Removed note by id [{}]", note.id),
            None => tracing::info!("Could not find note by id [{id}] in order to remove it"),
        }
        Ok(removed)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }
}
