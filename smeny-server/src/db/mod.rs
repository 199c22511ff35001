//! Database access layer
//!
//! Free async functions over `&PgPool`. List queries take a [`Scope`]
//! derived from the caller's role.

pub mod approvals;
pub mod attendance;
pub mod audit;
pub mod clients;
pub mod customers;
pub mod documents;
pub mod employees;
pub mod exchange_requests;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod invoices;
pub mod notifications;
pub mod ownership;
pub mod payroll;
pub mod projects;
pub mod reports;
pub mod sessions;
pub mod shifts;
pub mod stats;
pub mod users;
pub mod workplaces;

use shared::models::{User, UserRole};

/// Rows a caller may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Admin: everything
    All,
    /// Company: its own rows and its workers' rows
    Company(i64),
    /// Worker: own rows only
    User(i64),
}

impl Scope {
    pub fn of(user: &User) -> Self {
        match user.role {
            UserRole::Admin => Scope::All,
            UserRole::Company => Scope::Company(user.id),
            UserRole::Worker => Scope::User(user.id),
        }
    }

    /// `(company_id, user_id)` bind pair; `None` disables that filter
    pub fn binds(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            Scope::All => (None, None),
            Scope::Company(id) => (Some(id), None),
            Scope::User(id) => (None, Some(id)),
        }
    }
}

/// SQL predicate over a `user_id` column for the [`Scope::binds`] pair at
/// `$1`/`$2`
pub(crate) fn scope_filter(column: &str) -> String {
    format!(
        "($1::BIGINT IS NULL OR {column} = $1 \
           OR {column} IN (SELECT id FROM users WHERE parent_company_id = $1)) \
         AND ($2::BIGINT IS NULL OR {column} = $2)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_binds() {
        assert_eq!(Scope::All.binds(), (None, None));
        assert_eq!(Scope::Company(4).binds(), (Some(4), None));
        assert_eq!(Scope::User(9).binds(), (None, Some(9)));
    }

    #[test]
    fn test_scope_filter_mentions_column() {
        let sql = scope_filter("c.user_id");
        assert!(sql.contains("c.user_id = $1"));
        assert!(sql.contains("c.user_id = $2"));
    }
}
