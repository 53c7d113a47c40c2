use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use notes_core::{AppError, Violation};

use crate::dto::ErrorMessage;
use crate::state::AppState;

/// Where the token verification key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Shared HMAC secret (HS256).
    Secret(String),
    /// Identity provider's realm public key in PEM form (RS256).
    RsaPublicKeyPem(String),
}

/// Settings for verifying bearer tokens issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub key: KeySource,
    /// Expected `iss` claim, e.g. `https://sso.example.com/realms/notes`.
    pub issuer: Option<String>,
    /// Expected `aud` claim. Audience is not checked when unset.
    pub audience: Option<String>,
    /// Unauthenticated callers are redirected here instead of getting a 401.
    pub login_url: Option<String>,
    /// Realm role every caller must hold.
    pub required_role: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            key: KeySource::Secret(secret.into()),
            issuer: None,
            audience: None,
            login_url: None,
            required_role: None,
        }
    }
}

/// The authenticated caller, available to handlers as `Extension<Principal>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has no subject")]
    MissingSubject,

    #[error("role [{0}] is required")]
    MissingRole(String),
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    preferred_username: Option<String>,
    #[serde(default)]
    realm_access: Option<RealmAccess>,
}

#[derive(Debug, Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

/// Verifies JWTs and turns their claims into a [`Principal`].
pub struct Authenticator {
    key: DecodingKey,
    validation: Validation,
    login_url: Option<String>,
    required_role: Option<String>,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let (key, algorithm) = match &config.key {
            KeySource::Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            KeySource::RsaPublicKeyPem(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AppError::ConfigError(format!("Invalid RSA public key: {e}"))
                })?;
                (key, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key,
            validation,
            login_url: config.login_url.clone(),
            required_role: config.required_role.clone(),
        })
    }

    /// Authenticate the value of an `Authorization` header.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let token = header
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        let username = claims
            .preferred_username
            .filter(|u| !u.is_empty())
            .or(claims.sub.filter(|s| !s.is_empty()))
            .ok_or(AuthError::MissingSubject)?;
        if username.contains('\0') {
            return Err(AuthError::InvalidToken(
                "username contains a NUL character".into(),
            ));
        }
        let roles = claims.realm_access.map(|r| r.roles).unwrap_or_default();
        let principal = Principal { username, roles };

        if let Some(role) = &self.required_role
            && !principal.has_role(role)
        {
            return Err(AuthError::MissingRole(role.clone()));
        }

        Ok(principal)
    }

    fn reject(&self, error: &AuthError) -> Response {
        if let AuthError::MissingRole(_) = error {
            let body = ErrorMessage::new(
                StatusCode::FORBIDDEN,
                vec![Violation::new("authorization", error.to_string())],
            );
            return (StatusCode::FORBIDDEN, axum::Json(body)).into_response();
        }

        if let Some(login_url) = &self.login_url {
            return match HeaderValue::from_str(login_url) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            };
        }

        let body = ErrorMessage::new(
            StatusCode::UNAUTHORIZED,
            vec![Violation::new("authorization", error.to_string())],
        );
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
            axum::Json(body),
        )
            .into_response()
    }
}

/// Token part of an `Authorization` value; the scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Middleware that validates `Authorization: Bearer <jwt>` and stores the
/// caller as a [`Principal`] request extension.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.auth.authenticate(auth_header) {
        Ok(principal) => {
            tracing::trace!(user = %principal.username, "Authenticated request");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(error) => {
            tracing::debug!(%error, path = %request.uri().path(), "Rejecting request");
            state.auth.reject(&error)
        }
    }
}
