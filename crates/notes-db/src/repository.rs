use chrono::{DateTime, Utc};
use notes_core::error::AppError;
use notes_core::models::{NewNote, Note};
use notes_core::page::{Direction, Page, PageRequest, SortProperty};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Repository for note persistence in PostgreSQL.
#[derive(Clone)]
pub struct NoteRepository {
    pool: Pool<Postgres>,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new note. The stored version starts at 1.
    pub async fn insert(&self, note: &NewNote) -> Result<Note, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (id, username, content, created_at, last_modified_at, version)
            VALUES ($1, $2, $3, $4, $4, 1)
            RETURNING id, username, content, created_at, last_modified_at, version
            "#,
        )
        .bind(note.id)
        .bind(&note.username)
        .bind(&note.content)
        .bind(note.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, username, content, created_at, last_modified_at, version
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Fetch a page of notes. Unsorted requests come back in insertion order.
    pub async fn find_page(&self, request: &PageRequest) -> Result<Page<Note>, AppError> {
        let (total,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM notes"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let sql = format!(
            r#"
            SELECT id, username, content, created_at, last_modified_at, version
            FROM notes
            ORDER BY {}
            LIMIT $1 OFFSET $2
            "#,
            order_clause(request)
        );

        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(request.size as i64)
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let content = rows.into_iter().map(Into::into).collect();
        Ok(Page::new(content, request, total.max(0) as u64))
    }

    /// Compare-and-set update: only succeeds while the stored version equals
    /// `expected_version`.
    pub async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        expected_version: i64,
    ) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET content = $2, version = version + 1, last_modified_at = GREATEST($4, created_at)
            WHERE id = $1 AND version = $3
            RETURNING id, username, content, created_at, last_modified_at, version
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(expected_version)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if row.is_none() {
            tracing::debug!(%id, expected_version, "Compare-and-set update matched no row");
        }

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            DELETE FROM notes
            WHERE id = $1
            RETURNING id, username, content, created_at, last_modified_at, version
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Remove every note. Used by tests and local resets.
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM notes")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// Build an `ORDER BY` body from whitelisted columns; `id` breaks ties.
fn order_clause(request: &PageRequest) -> String {
    let Some(sort) = request.sort else {
        return "id ASC".to_string();
    };
    let column = match sort.property {
        SortProperty::Id => "id",
        SortProperty::Username => "username",
        SortProperty::Content => "content",
        SortProperty::CreatedAt => "created_at",
        SortProperty::LastModifiedAt => "last_modified_at",
        SortProperty::Version => "version",
    };
    let direction = match sort.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    if sort.property == SortProperty::Id {
        format!("id {direction}")
    } else {
        format!("{column} {direction}, id ASC")
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    username: String,
    content: String,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
    version: i64,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            username: row.username,
            content: row.content,
            created_at: row.created_at,
            last_modified_at: row.last_modified_at,
            version: row.version,
        }
    }
}

// -- Trait implementation --

impl notes_core::traits::NoteStore for NoteRepository {
    async fn insert(&self, note: &NewNote) -> Result<Note, AppError> {
        NoteRepository::insert(self, note).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        NoteRepository::find_by_id(self, id).await
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Note>, AppError> {
        NoteRepository::find_page(self, request).await
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        expected_version: i64,
    ) -> Result<Option<Note>, AppError> {
        NoteRepository::update_content(self, id, content, expected_version).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        NoteRepository::delete(self, id).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        NoteRepository::health_check(self).await
    }
}
