use axum::http::HeaderValue;
use notes_core::AppError;
use notes_core::PageLimits;
use notes_core::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::auth::{AuthConfig, KeySource};

pub const DEFAULT_PORT: u16 = 8080;

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub auth: AuthConfig,
    pub page_limits: PageLimits,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `NOTES_SERVER_PORT` (optional, defaults to 8080)
    /// - `NOTES_JWT_SECRET` or `NOTES_JWT_PUBLIC_KEY` (one is required)
    /// - `NOTES_JWT_ISSUER`, `NOTES_JWT_AUDIENCE` (optional)
    /// - `NOTES_LOGIN_URL`, `NOTES_REQUIRED_ROLE` (optional)
    /// - `NOTES_DEFAULT_PAGE_SIZE`, `NOTES_MAX_PAGE_SIZE` (optional)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("NOTES_SERVER_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid NOTES_SERVER_PORT '{raw}'"))
            })?,
        };

        let key = match (non_empty("NOTES_JWT_PUBLIC_KEY"), non_empty("NOTES_JWT_SECRET")) {
            (Some(pem), _) => KeySource::RsaPublicKeyPem(pem),
            (None, Some(secret)) => KeySource::Secret(secret),
            (None, None) => {
                return Err(AppError::ConfigError(
                    "Either NOTES_JWT_PUBLIC_KEY or NOTES_JWT_SECRET must be set".into(),
                ));
            }
        };

        let login_url = non_empty("NOTES_LOGIN_URL");
        if let Some(url) = &login_url
            && HeaderValue::from_str(url).is_err()
        {
            return Err(AppError::ConfigError(format!(
                "Invalid NOTES_LOGIN_URL '{}': not usable as a Location header",
                url.escape_debug()
            )));
        }

        let auth = AuthConfig {
            key,
            issuer: non_empty("NOTES_JWT_ISSUER"),
            audience: non_empty("NOTES_JWT_AUDIENCE"),
            login_url,
            required_role: non_empty("NOTES_REQUIRED_ROLE"),
        };

        let max_size = parse_size(&non_empty, "NOTES_MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;
        let default_size = parse_size(&non_empty, "NOTES_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if default_size > max_size {
            return Err(AppError::ConfigError(format!(
                "NOTES_DEFAULT_PAGE_SIZE ({default_size}) exceeds NOTES_MAX_PAGE_SIZE ({max_size})"
            )));
        }

        Ok(Self {
            port,
            auth,
            page_limits: PageLimits {
                default_size,
                max_size,
            },
        })
    }
}

fn parse_size(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
) -> Result<u32, AppError> {
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(size) if size >= 1 => Ok(size),
        _ => Err(AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a positive integer"
        ))),
    }
}
