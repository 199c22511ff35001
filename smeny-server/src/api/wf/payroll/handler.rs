//! Payroll Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{PayrollRun, PayrollRunCreate, PayrollRunDetail, PayrollStatus};
use shared::util::now_millis;

use crate::api::wf::{company_context, company_filter, ensure_manages};
use crate::api::{ApiResult, ClientIp, missing};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<PayrollRun, ServiceError> {
    let run = db::payroll::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::PayrollNotFound, id))?;
    ensure_manages(user, run.company_id, "payroll", id)?;
    Ok(run)
}

fn check_draft(run: &PayrollRun) -> Result<(), AppError> {
    if run.status == PayrollStatus::Finalized {
        return Err(missing(ErrorCode::PayrollFinalized, run.id));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<PayrollRun>> {
    Ok(Json(
        db::payroll::list(&state.pool, company_filter(&user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<PayrollRunDetail> {
    let run = load(&state, &user, id).await?;
    let lines = db::payroll::lines(&state.pool, id).await?;
    Ok(Json(PayrollRunDetail { run, lines }))
}

/// Compute a draft run from the period's attendance
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<PayrollRunCreate>,
) -> ApiResult<PayrollRunDetail> {
    if payload.period_start > payload.period_end {
        return Err(AppError::validation("period_start must not be after period_end").into());
    }
    let company_id = company_context(&user)?;

    let run = db::payroll::create_run(
        &state.pool,
        company_id,
        payload.period_start,
        payload.period_end,
        now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::PayrollEmpty))?;
    let lines = db::payroll::lines(&state.pool, run.id).await?;

    db::audit::record(
        &state.pool,
        Some(user.id()),
        "payroll.create",
        Some(json!({ "payroll_id": run.id, "total_gross": run.total_gross })),
        ip.as_deref(),
    )
    .await;
    tracing::info!(
        payroll_id = run.id,
        company_id,
        lines = lines.len(),
        "Payroll run created"
    );
    Ok(Json(PayrollRunDetail { run, lines }))
}

/// Lock a draft and notify the linked workers
pub async fn finalize(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> ApiResult<PayrollRun> {
    let run = load(&state, &user, id).await?;
    check_draft(&run)?;
    // lines of a draft are fixed, so recipients are known before locking
    let recipients = db::payroll::linked_users(&state.pool, id).await?;
    let run = db::payroll::finalize(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::PayrollFinalized, id))?;

    let now = now_millis();
    let body = format!(
        "Payroll for {} to {} was finalized",
        run.period_start, run.period_end
    );
    for recipient in recipients {
        db::notifications::notify(&state.pool, recipient, "Payroll finalized", &body, now).await;
    }

    db::audit::record(
        &state.pool,
        Some(user.id()),
        "payroll.finalize",
        Some(json!({ "payroll_id": id })),
        ip.as_deref(),
    )
    .await;
    Ok(Json(run))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let run = load(&state, &user, id).await?;
    check_draft(&run)?;
    if !db::payroll::delete_draft(&state.pool, id).await? {
        return Err(missing(ErrorCode::PayrollFinalized, id).into());
    }
    tracing::info!(payroll_id = id, "Payroll draft deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn run(status: PayrollStatus) -> PayrollRun {
        let d = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        PayrollRun {
            id: 9,
            company_id: 1,
            period_start: d,
            period_end: d,
            status,
            total_gross: Decimal::ZERO,
            created_at: 0,
        }
    }

    #[test]
    fn test_check_draft() {
        assert!(check_draft(&run(PayrollStatus::Draft)).is_ok());
        assert_eq!(
            check_draft(&run(PayrollStatus::Finalized)).unwrap_err().code,
            ErrorCode::PayrollFinalized
        );
    }
}
