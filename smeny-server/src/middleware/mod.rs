//! HTTP middleware shared by every route

pub mod logging;

pub use logging::logging_middleware;
