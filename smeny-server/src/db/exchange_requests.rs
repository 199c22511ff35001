//! Shift exchange requests
//!
//! Approval swaps the assignees of the two shifts. The swap, the assignee
//! check and the status change happen in one transaction with the request
//! and both shift rows locked.

use chrono::NaiveDate;
use shared::models::{AvailableShift, ExchangeRequest, ExchangeRequestDetail, RequestStatus};
use sqlx::PgPool;

use super::Scope;

const DETAIL_SELECT: &str = "SELECT r.id,
        r.requester_id, ru.first_name || ' ' || ru.last_name AS requester_name,
        r.requestee_id, eu.first_name || ' ' || eu.last_name AS requestee_name,
        r.requester_shift_id, rs.date AS requester_shift_date,
        rs.start_time AS requester_shift_start, rs.end_time AS requester_shift_end,
        r.requestee_shift_id, es.date AS requestee_shift_date,
        es.start_time AS requestee_shift_start, es.end_time AS requestee_shift_end,
        r.status, r.message, r.created_at, r.updated_at
     FROM exchange_requests r
     JOIN users ru ON ru.id = r.requester_id
     JOIN users eu ON eu.id = r.requestee_id
     JOIN shifts rs ON rs.id = r.requester_shift_id
     JOIN shifts es ON es.id = r.requestee_shift_id";

/// Result of an approval attempt
#[derive(Debug)]
pub enum SwapOutcome {
    Approved(ExchangeRequest),
    NotFound,
    AlreadyDecided(RequestStatus),
    /// One of the shifts is no longer assigned to the user it had when the
    /// request was made
    AssigneeChanged,
}

/// Worker: requests they sent or received. Company: requests of its workers.
pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<ExchangeRequestDetail>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "{DETAIL_SELECT}
         WHERE ($1::BIGINT IS NULL OR ru.parent_company_id = $1 OR eu.parent_company_id = $1)
           AND ($2::BIGINT IS NULL OR r.requester_id = $2 OR r.requestee_id = $2)
         ORDER BY r.created_at DESC"
    ))
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<ExchangeRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM exchange_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_detail(
    pool: &PgPool,
    id: i64,
) -> Result<Option<ExchangeRequestDetail>, sqlx::Error> {
    sqlx::query_as(&format!("{DETAIL_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, request: &ExchangeRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO exchange_requests (id, requester_id, requestee_id, requester_shift_id,
             requestee_shift_id, status, message, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(request.id)
    .bind(request.requester_id)
    .bind(request.requestee_id)
    .bind(request.requester_shift_id)
    .bind(request.requestee_shift_id)
    .bind(request.status)
    .bind(&request.message)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Pending request between the same two shifts
pub async fn pending_exists(
    pool: &PgPool,
    requester_shift_id: i64,
    requestee_shift_id: i64,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM exchange_requests
         WHERE requester_shift_id = $1 AND requestee_shift_id = $2 AND status = 'pending')",
    )
    .bind(requester_shift_id)
    .bind(requestee_shift_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// New `(shift_id, user_id)` assignments for an approval, given the locked
/// `(id, user_id)` rows. `None` when either shift no longer belongs to the
/// user it had when the request was made.
fn swap_plan(
    request: &ExchangeRequest,
    shifts: &[(i64, Option<i64>)],
) -> Option<[(i64, i64); 2]> {
    let assignee = |shift_id: i64| {
        shifts
            .iter()
            .find(|(id, _)| *id == shift_id)
            .and_then(|(_, user_id)| *user_id)
    };
    if assignee(request.requester_shift_id) != Some(request.requester_id)
        || assignee(request.requestee_shift_id) != Some(request.requestee_id)
    {
        return None;
    }
    Some([
        (request.requester_shift_id, request.requestee_id),
        (request.requestee_shift_id, request.requester_id),
    ])
}

/// Approve and swap, all or nothing
pub async fn approve(pool: &PgPool, id: i64, now: i64) -> Result<SwapOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let request: Option<ExchangeRequest> =
        sqlx::query_as("SELECT * FROM exchange_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(request) = request else {
        return Ok(SwapOutcome::NotFound);
    };
    if !request.status.is_pending() {
        return Ok(SwapOutcome::AlreadyDecided(request.status));
    }

    // Lock both shifts in id order
    let shifts: Vec<(i64, Option<i64>)> =
        sqlx::query_as("SELECT id, user_id FROM shifts WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(vec![request.requester_shift_id, request.requestee_shift_id])
            .fetch_all(&mut *tx)
            .await?;
    let Some(plan) = swap_plan(&request, &shifts) else {
        return Ok(SwapOutcome::AssigneeChanged);
    };

    for (shift_id, user_id) in plan {
        sqlx::query("UPDATE shifts SET user_id = $2, updated_at = $3 WHERE id = $1")
            .bind(shift_id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    let approved: ExchangeRequest = sqlx::query_as(
        "UPDATE exchange_requests SET status = 'approved', updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(SwapOutcome::Approved(approved))
}

/// Reject a pending request; `None` when it is no longer pending
pub async fn reject(
    pool: &PgPool,
    id: i64,
    now: i64,
) -> Result<Option<ExchangeRequest>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE exchange_requests SET status = 'rejected', updated_at = $2
         WHERE id = $1 AND status = 'pending'
         RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exchange_requests WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Coworkers' assigned shifts from `from` on
pub async fn available_shifts(
    pool: &PgPool,
    company_id: i64,
    exclude_user: i64,
    from: NaiveDate,
) -> Result<Vec<AvailableShift>, sqlx::Error> {
    sqlx::query_as(
        "SELECT s.id, s.workplace_id, w.name AS workplace_name, s.user_id,
                u.first_name || ' ' || u.last_name AS worker_name,
                s.date, s.start_time, s.end_time
         FROM shifts s
         JOIN workplaces w ON w.id = s.workplace_id
         JOIN users u ON u.id = s.user_id
         WHERE u.parent_company_id = $1 AND u.is_active AND s.user_id <> $2 AND s.date >= $3
         ORDER BY s.date, s.start_time",
    )
    .bind(company_id)
    .bind(exclude_user)
    .bind(from)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExchangeRequest {
        ExchangeRequest {
            id: 1,
            requester_id: 10,
            requestee_id: 20,
            requester_shift_id: 100,
            requestee_shift_id: 200,
            status: RequestStatus::Pending,
            message: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_swap_exchanges_assignees() {
        let plan = swap_plan(&request(), &[(100, Some(10)), (200, Some(20))]).unwrap();
        assert_eq!(plan, [(100, 20), (200, 10)]);
    }

    #[test]
    fn test_swap_refused_after_reassignment() {
        assert_eq!(
            swap_plan(&request(), &[(100, Some(10)), (200, Some(30))]),
            None
        );
        assert_eq!(swap_plan(&request(), &[(100, None), (200, Some(20))]), None);
    }

    #[test]
    fn test_swap_refused_when_shift_is_gone() {
        assert_eq!(swap_plan(&request(), &[(100, Some(10))]), None);
    }

    mod store {
        use super::super::*;
        use crate::db::fixtures::{
            insert_exchange_request, insert_shift, insert_user, insert_workplace,
        };
        use crate::db::shifts;
        use shared::models::{Shift, UserRole};

        const COMPANY: i64 = 10;
        const ALICE: i64 = 11;
        const BOB: i64 = 12;
        const CAROL: i64 = 13;
        const ALICE_SHIFT: i64 = 100;
        const BOB_SHIFT: i64 = 200;
        const REQUEST: i64 = 500;

        /// Company with three workers; Alice offers her shift for Bob's
        async fn seed(pool: &PgPool) -> sqlx::Result<(Shift, Shift)> {
            insert_user(pool, COMPANY, UserRole::Company, None).await?;
            for worker in [ALICE, BOB, CAROL] {
                insert_user(pool, worker, UserRole::Worker, Some(COMPANY)).await?;
            }
            insert_workplace(pool, 1, COMPANY).await?;
            let a = insert_shift(pool, ALICE_SHIFT, 1, Some(ALICE), 2).await?;
            let b = insert_shift(pool, BOB_SHIFT, 1, Some(BOB), 3).await?;
            insert_exchange_request(pool, REQUEST, (ALICE, ALICE_SHIFT), (BOB, BOB_SHIFT))
                .await?;
            Ok((a, b))
        }

        async fn shift(pool: &PgPool, id: i64) -> Shift {
            shifts::find(pool, id).await.unwrap().unwrap()
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_approve_swaps_only_the_assignees(pool: PgPool) -> sqlx::Result<()> {
            let (a, b) = seed(&pool).await?;

            let SwapOutcome::Approved(approved) = approve(&pool, REQUEST, 50).await? else {
                panic!("request was not approved");
            };
            assert_eq!(approved.status, RequestStatus::Approved);
            assert_eq!(approved.updated_at, 50);

            assert_eq!(
                shift(&pool, ALICE_SHIFT).await,
                Shift { user_id: Some(BOB), updated_at: 50, ..a }
            );
            assert_eq!(
                shift(&pool, BOB_SHIFT).await,
                Shift { user_id: Some(ALICE), updated_at: 50, ..b }
            );
            Ok(())
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_decided_request_cannot_be_decided_again(pool: PgPool) -> sqlx::Result<()> {
            seed(&pool).await?;
            assert!(matches!(
                approve(&pool, REQUEST, 50).await?,
                SwapOutcome::Approved(_)
            ));
            let after_first = (shift(&pool, ALICE_SHIFT).await, shift(&pool, BOB_SHIFT).await);

            assert!(matches!(
                approve(&pool, REQUEST, 60).await?,
                SwapOutcome::AlreadyDecided(RequestStatus::Approved)
            ));
            assert!(reject(&pool, REQUEST, 60).await?.is_none());
            // a second swap would have put the shifts back
            assert_eq!(
                (shift(&pool, ALICE_SHIFT).await, shift(&pool, BOB_SHIFT).await),
                after_first
            );
            Ok(())
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_reassigned_shift_blocks_the_swap(pool: PgPool) -> sqlx::Result<()> {
            let (a, b) = seed(&pool).await?;
            let reassigned = Shift { user_id: Some(CAROL), updated_at: 20, ..b };
            shifts::save(&pool, &reassigned).await?;

            assert!(matches!(
                approve(&pool, REQUEST, 50).await?,
                SwapOutcome::AssigneeChanged
            ));
            assert_eq!(shift(&pool, ALICE_SHIFT).await, a);
            assert_eq!(shift(&pool, BOB_SHIFT).await, reassigned);
            let request = find(&pool, REQUEST).await?.unwrap();
            assert_eq!(request.status, RequestStatus::Pending);
            Ok(())
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
        async fn test_missing_request(pool: PgPool) -> sqlx::Result<()> {
            seed(&pool).await?;
            assert!(matches!(approve(&pool, 999, 50).await?, SwapOutcome::NotFound));
            assert!(reject(&pool, 999, 50).await?.is_none());
            assert!(!delete(&pool, 999).await?);
            assert!(delete(&pool, REQUEST).await?);
            Ok(())
        }
    }
}
