//! Document Model (uploaded files)

use serde::{Deserialize, Serialize};

/// Document metadata; the file itself lives in document storage under `storage_key`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    #[serde(skip_serializing, default)]
    pub storage_key: String,
    pub description: Option<String>,
    pub created_at: i64,
}
