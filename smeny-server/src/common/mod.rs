//! Cross-cutting infrastructure

pub mod logger;
