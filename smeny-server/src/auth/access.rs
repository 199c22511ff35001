//! Record-level access decisions
//!
//! Every by-id endpoint loads the ownership facts of the addressed record and
//! runs [`decide`] against the caller. A missing record is reported as not
//! found before any role decision.
//!
//! | role    | allowed when                                                      |
//! |---------|-------------------------------------------------------------------|
//! | admin   | always                                                            |
//! | company | owns the record, manages it, or employs its owner                 |
//! | worker  | owns the record; reads a workplace managed by the employing company |

use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceError;
use crate::security_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Workplace,
    Shift,
    Customer,
    Invoice,
    Document,
    Report,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Workplace => "workplace",
            Self::Shift => "shift",
            Self::Customer => "customer",
            Self::Invoice => "invoice",
            Self::Document => "document",
            Self::Report => "report",
        }
    }

    pub fn not_found_code(&self) -> ErrorCode {
        match self {
            Self::Workplace => ErrorCode::WorkplaceNotFound,
            Self::Shift => ErrorCode::ShiftNotFound,
            Self::Customer => ErrorCode::CustomerNotFound,
            Self::Invoice => ErrorCode::InvoiceNotFound,
            Self::Document => ErrorCode::DocumentNotFound,
            Self::Report => ErrorCode::ReportNotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// Ownership facts of one record
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Ownership {
    /// User the record belongs to (a shift's assignee, a customer's owner, ...)
    pub owner_id: Option<i64>,
    /// `parent_company_id` of that user
    pub owner_parent_company_id: Option<i64>,
    /// Company managing the record (a shift's workplace owner)
    pub managing_company_id: Option<i64>,
}

/// The decision table
pub fn decide(kind: ResourceKind, action: Action, record: &Ownership, caller: &User) -> bool {
    let me = Some(caller.id);
    match caller.role {
        UserRole::Admin => true,
        UserRole::Company => {
            record.owner_id == me
                || record.managing_company_id == me
                || record.owner_parent_company_id == me
        }
        UserRole::Worker => {
            if record.owner_id == me {
                return true;
            }
            kind == ResourceKind::Workplace
                && action == Action::Read
                && caller.parent_company_id.is_some()
                && record.managing_company_id == caller.parent_company_id
        }
    }
}

/// Load the record and enforce the decision table
///
/// 404 when the record does not exist, 403 when the caller may not touch it.
pub async fn authorize(
    pool: &PgPool,
    caller: &User,
    kind: ResourceKind,
    id: i64,
    action: Action,
) -> Result<(), ServiceError> {
    let record = db::ownership::load(pool, kind, id)
        .await?
        .ok_or_else(|| AppError::new(kind.not_found_code()).with_detail("id", id))?;

    if decide(kind, action, &record, caller) {
        return Ok(());
    }

    security_log!(
        WARN,
        "permission_denied",
        user_id = caller.id,
        resource = kind.name(),
        resource_id = id,
        action = ?action
    );
    Err(AppError::permission_denied(format!("No access to this {}", kind.name())).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::user;

    const ADMIN: i64 = 1;
    const COMPANY_A: i64 = 10;
    const COMPANY_B: i64 = 20;
    const WORKER_A1: i64 = 11;
    const WORKER_A2: i64 = 12;
    const WORKER_B1: i64 = 21;

    fn admin() -> User {
        user(ADMIN, UserRole::Admin, None)
    }
    fn company_a() -> User {
        user(COMPANY_A, UserRole::Company, None)
    }
    fn company_b() -> User {
        user(COMPANY_B, UserRole::Company, None)
    }
    fn worker_a1() -> User {
        user(WORKER_A1, UserRole::Worker, Some(COMPANY_A))
    }
    fn worker_a2() -> User {
        user(WORKER_A2, UserRole::Worker, Some(COMPANY_A))
    }
    fn worker_b1() -> User {
        user(WORKER_B1, UserRole::Worker, Some(COMPANY_B))
    }

    /// Shift at a company A workplace, assigned to worker A1
    fn shift_of_a1() -> Ownership {
        Ownership {
            owner_id: Some(WORKER_A1),
            owner_parent_company_id: Some(COMPANY_A),
            managing_company_id: Some(COMPANY_A),
        }
    }

    fn workplace_of_a() -> Ownership {
        Ownership {
            owner_id: Some(COMPANY_A),
            owner_parent_company_id: None,
            managing_company_id: Some(COMPANY_A),
        }
    }

    /// Customer owned by worker A1 (owner only, no manager)
    fn customer_of_a1() -> Ownership {
        Ownership {
            owner_id: Some(WORKER_A1),
            owner_parent_company_id: Some(COMPANY_A),
            managing_company_id: None,
        }
    }

    #[test]
    fn test_admin_passes_everything() {
        for kind in [
            ResourceKind::Workplace,
            ResourceKind::Shift,
            ResourceKind::Customer,
            ResourceKind::Invoice,
            ResourceKind::Document,
            ResourceKind::Report,
        ] {
            for action in [Action::Read, Action::Write] {
                assert!(decide(kind, action, &Ownership::default(), &admin()));
                assert!(decide(kind, action, &shift_of_a1(), &admin()));
            }
        }
    }

    #[test]
    fn test_company_own_managed_and_worker_records() {
        let a = company_a();
        assert!(decide(ResourceKind::Workplace, Action::Write, &workplace_of_a(), &a));
        assert!(decide(ResourceKind::Shift, Action::Write, &shift_of_a1(), &a));
        assert!(decide(ResourceKind::Customer, Action::Read, &customer_of_a1(), &a));

        let open_shift = Ownership {
            owner_id: None,
            owner_parent_company_id: None,
            managing_company_id: Some(COMPANY_A),
        };
        assert!(decide(ResourceKind::Shift, Action::Write, &open_shift, &a));
    }

    #[test]
    fn test_company_denied_foreign_records() {
        let b = company_b();
        assert!(!decide(ResourceKind::Workplace, Action::Read, &workplace_of_a(), &b));
        assert!(!decide(ResourceKind::Shift, Action::Read, &shift_of_a1(), &b));
        assert!(!decide(ResourceKind::Customer, Action::Read, &customer_of_a1(), &b));
    }

    #[test]
    fn test_worker_own_records() {
        let w = worker_a1();
        assert!(decide(ResourceKind::Shift, Action::Read, &shift_of_a1(), &w));
        assert!(decide(ResourceKind::Shift, Action::Write, &shift_of_a1(), &w));
        assert!(decide(ResourceKind::Customer, Action::Write, &customer_of_a1(), &w));
    }

    #[test]
    fn test_worker_cannot_fetch_coworkers_shift() {
        assert!(!decide(
            ResourceKind::Shift,
            Action::Read,
            &shift_of_a1(),
            &worker_a2()
        ));
        assert!(!decide(
            ResourceKind::Shift,
            Action::Read,
            &shift_of_a1(),
            &worker_b1()
        ));
    }

    #[test]
    fn test_worker_reads_own_company_workplaces_only() {
        assert!(decide(
            ResourceKind::Workplace,
            Action::Read,
            &workplace_of_a(),
            &worker_a2()
        ));
        assert!(!decide(
            ResourceKind::Workplace,
            Action::Write,
            &workplace_of_a(),
            &worker_a2()
        ));
        assert!(!decide(
            ResourceKind::Workplace,
            Action::Read,
            &workplace_of_a(),
            &worker_b1()
        ));
    }

    #[test]
    fn test_worker_read_rule_limited_to_workplaces() {
        // same managing company, but a shift is not a workplace
        assert!(!decide(
            ResourceKind::Shift,
            Action::Read,
            &shift_of_a1(),
            &worker_a2()
        ));
    }

    #[test]
    fn test_worker_without_company_never_matches_missing_manager() {
        let orphan = user(99, UserRole::Worker, None);
        let unmanaged = Ownership {
            owner_id: Some(5),
            owner_parent_company_id: None,
            managing_company_id: None,
        };
        assert!(!decide(ResourceKind::Workplace, Action::Read, &unmanaged, &orphan));
    }

    mod store {
        use super::*;
        use crate::db::fixtures::{insert_shift, insert_user, insert_workplace};

        async fn seed(pool: &PgPool) -> sqlx::Result<()> {
            insert_user(pool, COMPANY_A, UserRole::Company, None).await?;
            insert_user(pool, COMPANY_B, UserRole::Company, None).await?;
            insert_user(pool, WORKER_A1, UserRole::Worker, Some(COMPANY_A)).await?;
            insert_user(pool, WORKER_B1, UserRole::Worker, Some(COMPANY_B)).await?;
            insert_workplace(pool, 1, COMPANY_A).await?;
            insert_shift(pool, 100, 1, Some(WORKER_A1), 2).await?;
            Ok(())
        }

        async fn code(
            pool: &PgPool,
            caller: &User,
            kind: ResourceKind,
            id: i64,
            action: Action,
        ) -> Option<ErrorCode> {
            authorize(pool, caller, kind, id, action)
                .await
                .err()
                .map(|e| AppError::from(e).code)
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_missing_record_is_not_found_for_everyone(pool: PgPool) -> sqlx::Result<()> {
            seed(&pool).await?;
            for caller in [admin(), company_b(), worker_b1()] {
                assert_eq!(
                    code(&pool, &caller, ResourceKind::Workplace, 999, Action::Write).await,
                    Some(ErrorCode::WorkplaceNotFound)
                );
                assert_eq!(
                    code(&pool, &caller, ResourceKind::Shift, 999, Action::Read).await,
                    Some(ErrorCode::ShiftNotFound)
                );
            }
            Ok(())
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_existing_record_follows_the_table(pool: PgPool) -> sqlx::Result<()> {
            seed(&pool).await?;
            let workplace = ResourceKind::Workplace;
            assert_eq!(code(&pool, &company_a(), workplace, 1, Action::Write).await, None);
            assert_eq!(code(&pool, &worker_a1(), workplace, 1, Action::Read).await, None);
            assert_eq!(
                code(&pool, &worker_a1(), workplace, 1, Action::Write).await,
                Some(ErrorCode::PermissionDenied)
            );
            assert_eq!(
                code(&pool, &company_b(), workplace, 1, Action::Read).await,
                Some(ErrorCode::PermissionDenied)
            );
            assert_eq!(code(&pool, &worker_a1(), ResourceKind::Shift, 100, Action::Write).await, None);
            assert_eq!(
                code(&pool, &worker_b1(), ResourceKind::Shift, 100, Action::Read).await,
                Some(ErrorCode::PermissionDenied)
            );
            Ok(())
        }
    }
}
