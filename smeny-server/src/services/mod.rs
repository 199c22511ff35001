//! Services used by the HTTP handlers

pub mod ares;
pub mod invoice_html;
pub mod storage;

pub use ares::{AresClient, AresError, AresService};
pub use storage::{DocumentStorage, StorageError};
