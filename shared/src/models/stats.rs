//! Dashboard statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `GET /api/stats` response, computed for the caller's scope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub shifts_this_month: i64,
    pub hours_this_month: Decimal,
    pub upcoming_shifts: i64,
    pub pending_exchange_requests: i64,
    pub unpaid_invoices: i64,
    pub unpaid_amount: Decimal,
    pub workers: i64,
}
