//! HTTP surface: the single-page form plus a small JSON API.
//!
//! Handlers stay thin. Validation lives in `models`, the consultation
//! pipeline in `consultation`, per-visitor state in `session`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::app_router;
pub use server::{start_server, AppServer, ServerError};
pub use types::ApiContext;
