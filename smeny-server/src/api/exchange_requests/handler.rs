//! Shift Exchange Request Handlers
//!
//! A worker offers one of their shifts for a coworker's shift. The coworker,
//! the requester's company or an admin approves; approval swaps the two
//! assignees atomically.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Local;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AvailableShift, ExchangeDecision, ExchangeRequest, ExchangeRequestCreate,
    ExchangeRequestDetail, RequestStatus, UserRole,
};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db::exchange_requests::SwapOutcome;
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::security_log;
use crate::state::AppState;

/// Who is asking about a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Admin,
    Requester,
    Requestee,
    /// Company employing the requester
    Company,
    Outsider,
}

impl Party {
    fn may_view(self) -> bool {
        self != Party::Outsider
    }

    fn may_decide(self, status: RequestStatus) -> bool {
        match status {
            RequestStatus::Approved => {
                matches!(self, Party::Admin | Party::Requestee | Party::Company)
            }
            RequestStatus::Rejected => self.may_view(),
            RequestStatus::Pending => false,
        }
    }
}

async fn party_of(
    state: &AppState,
    user: &CurrentUser,
    request: &ExchangeRequest,
) -> Result<Party, ServiceError> {
    let party = match user.role() {
        UserRole::Admin => Party::Admin,
        _ if request.requester_id == user.id() => Party::Requester,
        _ if request.requestee_id == user.id() => Party::Requestee,
        UserRole::Company => {
            let company = db::users::company_of(&state.pool, request.requester_id).await?;
            if company == Some(user.id()) {
                Party::Company
            } else {
                Party::Outsider
            }
        }
        UserRole::Worker => Party::Outsider,
    };
    Ok(party)
}

async fn load(state: &AppState, id: i64) -> Result<ExchangeRequest, ServiceError> {
    Ok(db::exchange_requests::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ExchangeRequestNotFound, id))?)
}

fn denied(user: &CurrentUser, id: i64) -> ServiceError {
    security_log!(
        WARN,
        "permission_denied",
        user_id = user.id(),
        resource = "exchange_request",
        resource_id = id
    );
    AppError::permission_denied("No access to this exchange request").into()
}

fn decided(status: RequestStatus) -> ServiceError {
    AppError::new(ErrorCode::ExchangeRequestDecided)
        .with_detail("status", serde_json::json!(status))
        .into()
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<ExchangeRequestDetail>> {
    let requests = db::exchange_requests::list(&state.pool, Scope::of(&user.user)).await?;
    Ok(Json(requests))
}

/// Coworkers' upcoming shifts the caller could swap with
pub async fn available_shifts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<AvailableShift>> {
    let Some(company_id) = user.user.company_scope() else {
        return Ok(Json(Vec::new()));
    };
    let today = Local::now().date_naive();
    let shifts =
        db::exchange_requests::available_shifts(&state.pool, company_id, user.id(), today).await?;
    Ok(Json(shifts))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ExchangeRequestCreate>,
) -> ApiResult<ExchangeRequest> {
    payload.validate()?;
    if user.role() != UserRole::Worker {
        return Err(AppError::permission_denied("Only workers can request shift exchanges").into());
    }
    if payload.requester_shift_id == payload.requestee_shift_id
        || payload.requestee_id == user.id()
    {
        return Err(AppError::new(ErrorCode::ExchangeSameShift).into());
    }

    let own_shift = db::shifts::find(&state.pool, payload.requester_shift_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ShiftNotFound, payload.requester_shift_id))?;
    if own_shift.user_id != Some(user.id()) {
        return Err(AppError::new(ErrorCode::ShiftNotAssigned)
            .with_detail("shift_id", own_shift.id)
            .into());
    }

    let their_shift = db::shifts::find(&state.pool, payload.requestee_shift_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ShiftNotFound, payload.requestee_shift_id))?;
    if their_shift.user_id != Some(payload.requestee_id) {
        return Err(AppError::new(ErrorCode::ShiftNotAssigned)
            .with_detail("shift_id", their_shift.id)
            .into());
    }

    let their_company = db::users::company_of(&state.pool, payload.requestee_id).await?;
    if their_company.is_none() || their_company != user.user.parent_company_id {
        return Err(AppError::new(ErrorCode::ExchangeCrossCompany).into());
    }

    if db::exchange_requests::pending_exists(&state.pool, own_shift.id, their_shift.id).await? {
        return Err(AppError::already_exists("Pending exchange request").into());
    }

    let now = now_millis();
    let request = ExchangeRequest {
        id: snowflake_id(),
        requester_id: user.id(),
        requestee_id: payload.requestee_id,
        requester_shift_id: own_shift.id,
        requestee_shift_id: their_shift.id,
        status: RequestStatus::Pending,
        message: crate::util::normalize_optional(payload.message),
        created_at: now,
        updated_at: now,
    };
    db::exchange_requests::create(&state.pool, &request).await?;

    let body = format!(
        "{} proposes to swap shift on {} for your shift on {}",
        user.user.full_name(),
        own_shift.date,
        their_shift.date
    );
    db::notifications::notify(&state.pool, request.requestee_id, "Shift exchange request", &body, now)
        .await;

    tracing::info!(request_id = request.id, requester_id = user.id(), "Exchange request created");
    Ok(Json(request))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<ExchangeRequestDetail> {
    let request = load(&state, id).await?;
    if !party_of(&state, &user, &request).await?.may_view() {
        return Err(denied(&user, id));
    }
    let detail = db::exchange_requests::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ExchangeRequestNotFound, id))?;
    Ok(Json(detail))
}

/// Approve (swap) or reject a pending request
pub async fn decide(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ExchangeDecision>,
) -> ApiResult<ExchangeRequest> {
    if payload.status == RequestStatus::Pending {
        return Err(AppError::validation("status must be approved or rejected").into());
    }

    let request = load(&state, id).await?;
    let party = party_of(&state, &user, &request).await?;
    if !party.may_view() {
        return Err(denied(&user, id));
    }
    if !request.status.is_pending() {
        return Err(decided(request.status));
    }
    if !party.may_decide(payload.status) {
        return Err(denied(&user, id));
    }

    let now = now_millis();
    let decided_request = match payload.status {
        RequestStatus::Approved => {
            match db::exchange_requests::approve(&state.pool, id, now).await? {
                SwapOutcome::Approved(r) => r,
                SwapOutcome::NotFound => {
                    return Err(missing(ErrorCode::ExchangeRequestNotFound, id).into());
                }
                SwapOutcome::AlreadyDecided(status) => return Err(decided(status)),
                SwapOutcome::AssigneeChanged => {
                    tracing::warn!(request_id = id, "Exchange approval hit a reassigned shift");
                    return Err(AppError::new(ErrorCode::ShiftAssigneeChanged)
                        .with_detail("id", id)
                        .into());
                }
            }
        }
        _ => db::exchange_requests::reject(&state.pool, id, now)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ExchangeRequestDecided))?,
    };

    let verb = if decided_request.status == RequestStatus::Approved {
        "approved"
    } else {
        "rejected"
    };
    for recipient in [decided_request.requester_id, decided_request.requestee_id] {
        if recipient != user.id() {
            db::notifications::notify(
                &state.pool,
                recipient,
                "Shift exchange decided",
                &format!("Shift exchange request was {verb}"),
                now,
            )
            .await;
        }
    }

    tracing::info!(request_id = id, decided_by = user.id(), status = verb, "Exchange request decided");
    Ok(Json(decided_request))
}

/// Requester (or admin) withdraws a pending request
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let request = load(&state, id).await?;
    let party = party_of(&state, &user, &request).await?;
    if !matches!(party, Party::Requester | Party::Admin) {
        return Err(denied(&user, id));
    }
    if !request.status.is_pending() {
        return Err(decided(request.status));
    }
    if !db::exchange_requests::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::ExchangeRequestNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_who_may_approve() {
        for party in [Party::Admin, Party::Requestee, Party::Company] {
            assert!(party.may_decide(RequestStatus::Approved), "{party:?}");
        }
        assert!(!Party::Requester.may_decide(RequestStatus::Approved));
        assert!(!Party::Outsider.may_decide(RequestStatus::Approved));
    }

    #[test]
    fn test_requester_may_withdraw_by_rejecting() {
        assert!(Party::Requester.may_decide(RequestStatus::Rejected));
        assert!(Party::Requestee.may_decide(RequestStatus::Rejected));
        assert!(!Party::Outsider.may_decide(RequestStatus::Rejected));
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        assert!(!Party::Admin.may_decide(RequestStatus::Pending));
    }
}
