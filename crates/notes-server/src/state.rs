use notes_core::PageLimits;
use notes_db::Database;

use crate::auth::Authenticator;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub auth: Authenticator,
    /// Default and maximum page sizes for list endpoints.
    pub page_limits: PageLimits,
}
