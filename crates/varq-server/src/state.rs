//! Application state.

use varq_core::AppConfig;

use crate::repository::Repository;

/// Shared application state.
pub struct AppState {
    /// Repository over the database connection pool
    pub repository: Repository,
    /// Application configuration
    pub config: AppConfig,
}
