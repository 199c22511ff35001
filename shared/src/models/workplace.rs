//! Workplace Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::double_option;

/// Workplace entity, owned by a company account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Workplace {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create workplace payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkplaceCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    /// Admin only: create on behalf of this company
    pub owner_id: Option<i64>,
}

/// Update workplace payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WorkplaceUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// `null` clears the address
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500))]
    pub notes: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_can_clear_fields() {
        let update: WorkplaceUpdate =
            serde_json::from_str(r#"{"address":null,"notes":"Vrátnice"}"#).unwrap();
        assert_eq!(update.name, None);
        assert_eq!(update.address, Some(None));
        assert_eq!(update.notes, Some(Some("Vrátnice".into())));

        let untouched: WorkplaceUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.address, None);
    }

    #[test]
    fn test_update_validates_set_values() {
        let update = WorkplaceUpdate {
            address: Some(Some("x".repeat(501))),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        let cleared = WorkplaceUpdate {
            address: Some(None),
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
    }
}
