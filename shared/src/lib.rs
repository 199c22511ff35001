//! Shared types for the Směny backend
//!
//! Error codes and the unified error body, domain models, request query
//! types and id/time utilities used by the server and its clients.

pub mod error;
pub mod models;
pub mod request;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
