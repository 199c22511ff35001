//! Workflow manager API, mounted under `/api/wf`
//!
//! Records belong to a company. The company (and admins) manage them;
//! workers linked to an employee row read their own records.

pub mod approvals;
pub mod attendance;
pub mod clients;
pub mod employees;
pub mod notifications;
pub mod payroll;
pub mod projects;

use axum::Router;
use shared::error::AppError;
use shared::models::UserRole;

use crate::auth::CurrentUser;
use crate::security_log;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/employees", employees::router())
        .nest("/clients", clients::router())
        .nest("/projects", projects::router())
        .nest("/attendance", attendance::router())
        .nest("/payroll", payroll::router())
        .nest("/approvals", approvals::router())
        .nest("/notifications", notifications::router())
}

/// Company new records are filed under
pub(crate) fn company_context(user: &CurrentUser) -> Result<i64, AppError> {
    user.user
        .company_scope()
        .ok_or_else(|| AppError::invalid_request("Workflow records belong to a company account"))
}

/// List filter for manager routes: admins see all companies
pub(crate) fn company_filter(user: &CurrentUser) -> Option<i64> {
    match user.role() {
        UserRole::Admin => None,
        _ => user.user.company_scope(),
    }
}

/// Admin, or the company owning the record
pub(crate) fn manages(user: &CurrentUser, company_id: i64) -> bool {
    match user.role() {
        UserRole::Admin => true,
        UserRole::Company => user.id() == company_id,
        UserRole::Worker => false,
    }
}

pub(crate) fn ensure_manages(
    user: &CurrentUser,
    company_id: i64,
    resource: &'static str,
    id: i64,
) -> Result<(), AppError> {
    if manages(user, company_id) {
        return Ok(());
    }
    security_log!(
        WARN,
        "permission_denied",
        user_id = user.id(),
        resource = resource,
        resource_id = id
    );
    Err(AppError::permission_denied(format!("No access to this {resource}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::csrf::TokenSource;
    use shared::models::User;
    use uuid::Uuid;

    pub fn caller(id: i64, role: UserRole, parent: Option<i64>) -> CurrentUser {
        CurrentUser {
            user: User {
                id,
                username: format!("u{id}"),
                email: format!("u{id}@example.cz"),
                password_hash: String::new(),
                first_name: "Test".into(),
                last_name: "User".into(),
                phone: None,
                role,
                parent_company_id: parent,
                company_name: None,
                company_ico: None,
                company_dic: None,
                company_address: None,
                hourly_rate: None,
                is_active: true,
                created_at: 0,
                updated_at: 0,
            },
            session_id: Uuid::nil(),
            csrf_token: String::new(),
            source: TokenSource::Bearer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::caller;
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_company_context() {
        assert_eq!(company_context(&caller(5, UserRole::Company, None)).unwrap(), 5);
        assert_eq!(company_context(&caller(6, UserRole::Worker, Some(5))).unwrap(), 5);
        assert_eq!(
            company_context(&caller(1, UserRole::Admin, None)).unwrap_err().code,
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn test_manages() {
        assert!(manages(&caller(1, UserRole::Admin, None), 5));
        assert!(manages(&caller(5, UserRole::Company, None), 5));
        assert!(!manages(&caller(7, UserRole::Company, None), 5));
        assert!(!manages(&caller(6, UserRole::Worker, Some(5)), 5));
    }

    #[test]
    fn test_company_filter() {
        assert_eq!(company_filter(&caller(1, UserRole::Admin, None)), None);
        assert_eq!(company_filter(&caller(5, UserRole::Company, None)), Some(5));
    }
}
