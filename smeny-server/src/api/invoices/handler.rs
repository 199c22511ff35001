//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DEFAULT_CURRENCY, Invoice, InvoiceCreate, InvoiceDetail, InvoiceItemInput, InvoiceQuery,
    InvoiceUpdate, invoice_total, next_invoice_number,
    numeric::{MONEY, QUANTITY},
};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db::invoices::PricedItems;
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::services::invoice_html;
use crate::state::AppState;
use crate::util::normalize_optional;

/// Items must exist, with positive quantities and non-negative prices.
/// Quantities, prices and totals must be representable in their columns.
fn check_items(items: &[InvoiceItemInput]) -> Result<PricedItems<'_>, AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::InvoiceEmpty));
    }
    let mut totals = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if item.quantity <= Decimal::ZERO {
            return Err(AppError::validation("Item quantity must be positive").with_detail("item", i));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(
                AppError::validation("Item unit price must not be negative").with_detail("item", i)
            );
        }
        if !QUANTITY.fits(item.quantity) {
            return Err(AppError::validation(
                "Item quantity is too large or has more than 3 decimal places",
            )
            .with_detail("item", i));
        }
        if !MONEY.fits(item.unit_price) {
            return Err(AppError::validation(
                "Item unit price is too large or has more than 2 decimal places",
            )
            .with_detail("item", i));
        }
        let total = item
            .total()
            .filter(|t| MONEY.fits(*t))
            .ok_or_else(|| AppError::validation("Item total is too large").with_detail("item", i))?;
        totals.push(total);
    }
    let total = invoice_total(items)
        .filter(|t| MONEY.fits(*t))
        .ok_or_else(|| AppError::validation("Invoice total is too large"))?;
    Ok(PricedItems {
        items,
        totals,
        total,
    })
}

fn check_dates(issue: NaiveDate, due: NaiveDate) -> Result<(), AppError> {
    if due < issue {
        return Err(AppError::validation("due_date must not be before issue_date"));
    }
    Ok(())
}

async fn detail(state: &AppState, id: i64) -> Result<InvoiceDetail, ServiceError> {
    let invoice = db::invoices::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::InvoiceNotFound, id))?;
    let items = db::invoices::items(&state.pool, id).await?;
    let customer = db::customers::find(&state.pool, invoice.customer_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::CustomerNotFound, invoice.customer_id))?;
    Ok(InvoiceDetail {
        invoice,
        items,
        customer,
    })
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<Vec<Invoice>> {
    let invoices = db::invoices::list(&state.pool, Scope::of(&user.user), &query).await?;
    Ok(Json(invoices))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<InvoiceDetail> {
    check_access(&state, &user, ResourceKind::Invoice, id, Action::Read).await?;
    Ok(Json(detail(&state, id).await?))
}

/// Create with items; the number defaults to the issuer's next `YYYYNNNN`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<InvoiceCreate>,
) -> ApiResult<InvoiceDetail> {
    payload.validate()?;
    let priced = check_items(&payload.items)?;
    check_dates(payload.issue_date, payload.due_date)?;
    check_access(&state, &user, ResourceKind::Customer, payload.customer_id, Action::Read).await?;

    let invoice_number = match normalize_optional(payload.invoice_number) {
        Some(number) => {
            if db::invoices::number_taken(&state.pool, user.id(), &number, None).await? {
                return Err(AppError::new(ErrorCode::InvoiceNumberExists)
                    .with_detail("invoice_number", number)
                    .into());
            }
            number
        }
        None => {
            let year = payload.issue_date.year();
            let last = db::invoices::last_number(&state.pool, user.id(), year).await?;
            next_invoice_number(year, last.as_deref())
        }
    };

    let now = now_millis();
    let invoice = Invoice {
        id: snowflake_id(),
        user_id: user.id(),
        customer_id: payload.customer_id,
        variable_symbol: normalize_optional(payload.variable_symbol)
            .or_else(|| Some(invoice_number.clone())),
        invoice_number,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        taxable_date: payload.taxable_date,
        currency: normalize_optional(payload.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        is_paid: false,
        notes: normalize_optional(payload.notes),
        total_amount: priced.total,
        created_at: now,
        updated_at: now,
    };
    let created = db::invoices::create(&state.pool, &invoice, &priced).await?;
    tracing::info!(
        invoice_id = created.id,
        invoice_number = %created.invoice_number,
        total = %created.total_amount,
        "Invoice created"
    );
    Ok(Json(detail(&state, created.id).await?))
}

/// Header fields are patched; `items` replaces all items and the total
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<InvoiceUpdate>,
) -> ApiResult<InvoiceDetail> {
    payload.validate()?;
    check_access(&state, &user, ResourceKind::Invoice, id, Action::Write).await?;
    let current = db::invoices::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::InvoiceNotFound, id))?;

    let priced = payload.items.as_deref().map(check_items).transpose()?;
    check_dates(
        payload.issue_date.unwrap_or(current.issue_date),
        payload.due_date.unwrap_or(current.due_date),
    )?;
    if let Some(customer_id) = payload.customer_id
        && customer_id != current.customer_id
    {
        check_access(&state, &user, ResourceKind::Customer, customer_id, Action::Read).await?;
    }
    payload.invoice_number = normalize_optional(payload.invoice_number);
    if let Some(number) = &payload.invoice_number
        && db::invoices::number_taken(&state.pool, current.user_id, number, Some(id)).await?
    {
        return Err(AppError::new(ErrorCode::InvoiceNumberExists)
            .with_detail("invoice_number", number.clone())
            .into());
    }
    payload.currency = payload.currency.map(|c| c.trim().to_uppercase());
    payload.variable_symbol = payload.variable_symbol.map(normalize_optional);
    payload.notes = payload.notes.map(normalize_optional);

    db::invoices::update(&state.pool, id, &payload, priced.as_ref(), now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::InvoiceNotFound, id))?;
    Ok(Json(detail(&state, id).await?))
}

pub async fn toggle_paid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Invoice> {
    check_access(&state, &user, ResourceKind::Invoice, id, Action::Write).await?;
    let invoice = db::invoices::toggle_paid(&state.pool, id, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::InvoiceNotFound, id))?;
    tracing::info!(invoice_id = id, is_paid = invoice.is_paid, "Invoice payment toggled");
    Ok(Json(invoice))
}

/// Printable HTML rendering
pub async fn print(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, ServiceError> {
    check_access(&state, &user, ResourceKind::Invoice, id, Action::Read).await?;
    let detail = detail(&state, id).await?;
    let issuer = db::users::find_by_id(&state.pool, detail.invoice.user_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::UserNotFound, detail.invoice.user_id))?;
    Ok(Html(invoice_html::render(&detail, &issuer)))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Invoice, id, Action::Write).await?;
    if !db::invoices::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::InvoiceNotFound, id).into());
    }
    tracing::info!(invoice_id = id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(quantity: &str, price: &str) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "Úklid".into(),
            quantity: Decimal::from_str(quantity).unwrap(),
            unit: None,
            unit_price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_check_items() {
        assert_eq!(check_items(&[]).unwrap_err().code, ErrorCode::InvoiceEmpty);
        assert!(check_items(&[item("2", "150")]).is_ok());
        assert!(check_items(&[item("1", "0")]).is_ok());
        assert_eq!(
            check_items(&[item("0", "150")]).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        assert!(check_items(&[item("1", "10"), item("1", "-5")]).is_err());
    }

    #[test]
    fn test_check_items_prices_each_line() {
        let items = [item("1.5", "250"), item("3", "333.33")];
        let priced = check_items(&items).unwrap();
        assert_eq!(
            priced.totals,
            vec![Decimal::from(375), Decimal::from_str("999.99").unwrap()]
        );
        assert_eq!(priced.total, Decimal::from_str("1374.99").unwrap());
    }

    #[test]
    fn test_check_items_rejects_huge_amounts() {
        let err = check_items(&[item("1000000000000000", "1000000000000000")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        // each line fits but the product does not
        assert!(check_items(&[item("100000000", "100000")]).is_err());
        // each item total fits but the sum does not
        let big = item("1", "999999999999");
        assert!(check_items(&[big.clone(), big]).is_err());
    }

    #[test]
    fn test_check_items_rejects_extra_decimals() {
        assert!(check_items(&[item("0.125", "10.50")]).is_ok());
        assert!(check_items(&[item("0.0004", "10000")]).is_err());
        assert!(check_items(&[item("1", "19.999")]).is_err());
    }

    #[test]
    fn test_check_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 4, day).unwrap();
        assert!(check_dates(d(1), d(15)).is_ok());
        assert!(check_dates(d(1), d(1)).is_ok());
        assert!(check_dates(d(15), d(1)).is_err());
    }
}
