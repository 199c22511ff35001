//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Account errors (3xxx)
    Account,
    /// Scheduling errors (4xxx)
    Scheduling,
    /// Invoicing errors (5xxx)
    Invoicing,
    /// Document errors (6xxx)
    Document,
    /// Workflow errors (7xxx)
    Workflow,
    /// External service errors (8xxx)
    External,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Account,
            4000..5000 => Self::Scheduling,
            5000..6000 => Self::Invoicing,
            6000..7000 => Self::Document,
            7000..8000 => Self::Workflow,
            8000..9000 => Self::External,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Account => "account",
            Self::Scheduling => "scheduling",
            Self::Invoicing => "invoicing",
            Self::Document => "document",
            Self::Workflow => "workflow",
            Self::External => "external",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(4101), ErrorCategory::Scheduling);
        assert_eq!(ErrorCategory::from_code(5101), ErrorCategory::Invoicing);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Document);
        assert_eq!(ErrorCategory::from_code(7401), ErrorCategory::Workflow);
        assert_eq!(ErrorCategory::from_code(8003), ErrorCategory::External);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::CsrfTokenInvalid.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::ExchangeRequestDecided.category(),
            ErrorCategory::Scheduling
        );
        assert_eq!(ErrorCode::InvoiceEmpty.category(), ErrorCategory::Invoicing);
        assert_eq!(ErrorCode::ApprovalDecided.category(), ErrorCategory::Workflow);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Scheduling).unwrap();
        assert_eq!(json, "\"scheduling\"");
        let category: ErrorCategory = serde_json::from_str("\"external\"").unwrap();
        assert_eq!(category, ErrorCategory::External);
        assert_eq!(category.name(), "external");
    }
}
