//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::normalize_optional;

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Customer>> {
    Ok(Json(
        db::customers::list(&state.pool, Scope::of(&user.user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Customer> {
    check_access(&state, &user, ResourceKind::Customer, id, Action::Read).await?;
    let customer = db::customers::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::CustomerNotFound, id))?;
    Ok(Json(customer))
}

/// Customers belong to the caller
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    payload.validate()?;
    let now = now_millis();
    let customer = Customer {
        id: snowflake_id(),
        user_id: user.id(),
        name: payload.name.trim().to_string(),
        ico: normalize_optional(payload.ico),
        dic: normalize_optional(payload.dic),
        address: normalize_optional(payload.address),
        city: normalize_optional(payload.city),
        zip: normalize_optional(payload.zip),
        email: normalize_optional(payload.email),
        phone: normalize_optional(payload.phone),
        created_at: now,
        updated_at: now,
    };
    db::customers::create(&state.pool, &customer).await?;
    Ok(Json(customer))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    payload.validate()?;
    check_access(&state, &user, ResourceKind::Customer, id, Action::Write).await?;
    let customer = db::customers::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::CustomerNotFound, id))?;
    Ok(Json(customer))
}

/// Refused while invoices reference the customer
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Customer, id, Action::Write).await?;
    if db::customers::has_invoices(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CustomerHasInvoices)
            .with_detail("id", id)
            .into());
    }
    if !db::customers::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::CustomerNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
