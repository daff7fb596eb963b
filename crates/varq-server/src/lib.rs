//! HTTP server for varq.

pub mod handlers;
pub mod repository;
pub mod state;

pub use handlers::router;
pub use repository::Repository;
pub use state::AppState;
