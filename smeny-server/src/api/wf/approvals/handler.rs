//! Approval Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Approval, ApprovalCreate, ApprovalDecision, RequestStatus, numeric::MONEY};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::wf::{company_context, ensure_manages};
use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db::{self, Scope};
use crate::state::AppState;
use crate::util::{check_amount, normalize_optional};

fn status_word(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Approved => "approved",
        RequestStatus::Rejected => "rejected",
        RequestStatus::Pending => "pending",
    }
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Approval>> {
    Ok(Json(
        db::approvals::list(&state.pool, Scope::of(&user.user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Approval> {
    let approval = db::approvals::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ApprovalNotFound, id))?;
    if approval.requested_by != user.id() {
        ensure_manages(&user, approval.company_id, "approval", id)?;
    }
    Ok(Json(approval))
}

/// File a request with the caller's company
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ApprovalCreate>,
) -> ApiResult<Approval> {
    payload.validate()?;
    if let Some(amount) = payload.amount {
        check_amount("amount", amount, MONEY)?;
    }
    let company_id = company_context(&user)?;

    let approval = Approval {
        id: snowflake_id(),
        company_id,
        requested_by: user.id(),
        kind: payload.kind,
        subject: payload.subject.trim().to_string(),
        detail: normalize_optional(payload.detail),
        amount: payload.amount,
        status: RequestStatus::Pending,
        decided_by: None,
        decided_at: None,
        created_at: now_millis(),
    };
    db::approvals::create(&state.pool, &approval).await?;

    if approval.requested_by != company_id {
        db::notifications::notify(
            &state.pool,
            company_id,
            "Approval requested",
            &approval.subject,
            approval.created_at,
        )
        .await;
    }
    tracing::info!(approval_id = approval.id, company_id, "Approval requested");
    Ok(Json(approval))
}

/// Approve or reject a pending request and notify the requester
pub async fn decide(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovalDecision>,
) -> ApiResult<Approval> {
    if payload.status.is_pending() {
        return Err(AppError::validation("status must be approved or rejected").into());
    }
    let existing = db::approvals::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ApprovalNotFound, id))?;
    ensure_manages(&user, existing.company_id, "approval", id)?;
    if !existing.status.is_pending() {
        return Err(missing(ErrorCode::ApprovalDecided, id).into());
    }

    let now = now_millis();
    let approval = db::approvals::decide(&state.pool, id, payload.status, user.id(), now)
        .await?
        .ok_or_else(|| missing(ErrorCode::ApprovalDecided, id))?;

    if approval.requested_by != user.id() {
        db::notifications::notify(
            &state.pool,
            approval.requested_by,
            "Approval decided",
            &format!("\"{}\" was {}", approval.subject, status_word(approval.status)),
            now,
        )
        .await;
    }
    tracing::info!(approval_id = id, status = status_word(approval.status), "Approval decided");
    Ok(Json(approval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word() {
        assert_eq!(status_word(RequestStatus::Approved), "approved");
        assert_eq!(status_word(RequestStatus::Rejected), "rejected");
    }
}
