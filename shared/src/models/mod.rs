//! Data models
//!
//! Shared between the server and front-end clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`,
//! status enums map onto PostgreSQL enum types behind the same feature.
//! All IDs are `i64` snowflake ids.

use serde::{Deserialize, Deserializer};

pub mod approval;
pub mod ares;
pub mod attendance;
pub mod audit;
pub mod client;
pub mod customer;
pub mod document;
pub mod employee;
pub mod exchange_request;
pub mod invoice;
pub mod notification;
pub mod numeric;
pub mod payroll;
pub mod project;
pub mod report;
pub mod shift;
pub mod stats;
pub mod user;
pub mod workplace;

// Re-exports
pub use approval::*;
pub use ares::*;
pub use attendance::*;
pub use audit::*;
pub use client::*;
pub use customer::*;
pub use document::*;
pub use employee::*;
pub use exchange_request::*;
pub use invoice::*;
pub use notification::*;
pub use payroll::*;
pub use project::*;
pub use report::*;
pub use shift::*;
pub use stats::*;
pub use user::*;
pub use workplace::*;

/// Tells an explicit `null` (`Some(None)`) apart from an absent field
/// (`None`) in update payloads
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
