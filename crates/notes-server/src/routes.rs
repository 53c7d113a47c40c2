use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use notes_core::validation::{MUST_NOT_BE_BLANK, Validate};
use notes_core::{AppError, Note, NoteService, PageRequest, Violation};
use notes_db::NoteRepository;

use crate::auth::{Principal, require_bearer};
use crate::dto::{
    ErrorMessage, HealthResponse, NoteDto, NotePageResponse, PageQuery, SaveNoteRequest,
    SaveNoteResponse, UpdateNoteRequest,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/notes", get(list_notes).post(save_note))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

fn service(state: &AppState) -> NoteService<NoteRepository> {
    NoteService::new(state.db.note_repo())
}

/// Blank path ids are a client error; anything else that is not a known id
/// is simply not found.
fn require_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(AppError::violation("id", MUST_NOT_BE_BLANK).into());
    }
    Ok(())
}

fn found_or_404(found: Option<Note>) -> Response {
    match found {
        Some(note) => Json(NoteDto::from(note)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/notes",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of notes in insertion order", body = NotePageResponse),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorMessage),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<NotePageResponse>, ApiError> {
    let Query(query) = query?;
    let request = PageRequest::from_query(
        query.page,
        query.size,
        query.sort.as_deref(),
        state.page_limits,
    )
    .map_err(|v| AppError::Validation(vec![v]))?;

    let page = service(&state).get_page(&request).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = SaveNoteRequest,
    responses(
        (status = 201, description = "Note created", body = SaveNoteResponse),
        (status = 400, description = "Validation failed", body = ErrorMessage),
        (status = 401, description = "Unauthorized"),
        (status = 415, description = "Body is not JSON", body = ErrorMessage),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
pub async fn save_note(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<SaveNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    body.validate()?;
    let content = body.content.unwrap_or_default();

    let saved = service(&state)
        .save_note(&principal.username, &content)
        .await?;

    Ok((StatusCode::CREATED, Json(SaveNoteResponse::from(saved))))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note details", body = NoteDto),
        (status = 400, description = "Blank id", body = ErrorMessage),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Note not found"),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_id(&id)?;
    let note = service(&state).find_by_id(&id).await?;
    Ok(found_or_404(note))
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteDto),
        (status = 400, description = "Validation failed", body = ErrorMessage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Note belongs to another user", body = ErrorMessage),
        (status = 404, description = "Note not found"),
        (status = 409, description = "Version does not match", body = ErrorMessage),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    let mut violations = body.violations();
    if id.trim().is_empty() {
        violations.push(Violation::new("id", MUST_NOT_BE_BLANK));
    }
    if !violations.is_empty() {
        violations.sort();
        return Err(AppError::Validation(violations).into());
    }
    let content = body.content.unwrap_or_default();

    let updated = service(&state)
        .update_note(
            &principal.username,
            &id,
            &content,
            body.version.unwrap_or_default(),
        )
        .await?;
    Ok(found_or_404(updated))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Removed note", body = NoteDto),
        (status = 400, description = "Blank id", body = ErrorMessage),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Note not found"),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_id(&id)?;
    let removed = service(&state).remove_note(&id).await?;
    Ok(found_or_404(removed))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match service(&state).health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            "error"
        }
    };

    let (status, label) = if db_status == "ok" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: label,
        database: db_status,
    };

    (status, Json(response))
}
