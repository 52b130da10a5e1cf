//! Health and manual retry HTTP surface.
//!
//! Deliberately thin: a liveness/readiness probe backed by the broker
//! connectivity status, and a manual re-enqueue path that validates its body
//! with the same schema as the broker path.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
