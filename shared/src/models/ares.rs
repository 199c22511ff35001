//! ARES (Czech business register) lookup result

use serde::{Deserialize, Serialize};

/// Company data returned by `GET /api/ares/{ico}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AresSubject {
    pub ico: String,
    pub name: String,
    pub dic: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
}
