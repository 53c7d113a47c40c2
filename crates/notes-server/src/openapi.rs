use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notes API",
        version = "0.1.0",
        description = "Per-user notes with optimistic locking."
    ),
    paths(
        crate::routes::list_notes,
        crate::routes::save_note,
        crate::routes::get_note,
        crate::routes::update_note,
        crate::routes::delete_note,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::NoteDto,
        crate::dto::SaveNoteRequest,
        crate::dto::SaveNoteResponse,
        crate::dto::UpdateNoteRequest,
        crate::dto::NotePageResponse,
        crate::dto::HealthResponse,
        crate::dto::ViolationResponse,
        crate::dto::ErrorMessage,
    )),
    tags(
        (name = "notes", description = "Note management"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the JWT bearer security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity provider."))
                        .build(),
                ),
            );
        }
    }
}
