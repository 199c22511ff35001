//! Invoice Model
//!
//! `total_amount` is always derived from the items: every item total is
//! `quantity × unit_price` rounded to 2 decimal places and the invoice total
//! is their sum.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::customer::Customer;
use super::double_option;

pub const DEFAULT_CURRENCY: &str = "CZK";

/// Invoice entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub user_id: i64,
    pub customer_id: i64,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub taxable_date: Option<NaiveDate>,
    pub variable_symbol: Option<String>,
    pub currency: String,
    pub is_paid: bool,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Invoice line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Invoice with items and customer (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub customer: Customer,
}

/// Line item input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemInput {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub quantity: Decimal,
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    pub unit_price: Decimal,
}

impl InvoiceItemInput {
    pub fn total(&self) -> Option<Decimal> {
        item_total(self.quantity, self.unit_price)
    }
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceCreate {
    pub customer_id: i64,
    /// Generated as `YYYYNNNN` when omitted
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub taxable_date: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub variable_symbol: Option<String>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Vec<InvoiceItemInput>,
}

/// Update invoice payload; `items`, when present, replaces all items
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InvoiceUpdate {
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// `null` clears the field; likewise `variable_symbol` and `notes`
    #[serde(default, deserialize_with = "double_option")]
    pub taxable_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 20))]
    pub variable_symbol: Option<Option<String>>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000))]
    pub notes: Option<Option<String>>,
    pub is_paid: Option<bool>,
    #[validate(nested)]
    pub items: Option<Vec<InvoiceItemInput>>,
}

/// Invoice list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub paid: Option<bool>,
    pub customer_id: Option<i64>,
}

/// `quantity × unit_price`, rounded half away from zero to 2 dp; `None` on
/// overflow
pub fn item_total(quantity: Decimal, unit_price: Decimal) -> Option<Decimal> {
    quantity
        .checked_mul(unit_price)
        .map(|t| t.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Sum of rounded item totals; `None` on overflow
pub fn invoice_total(items: &[InvoiceItemInput]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total()?))
}

/// Next `YYYYNNNN` number after `last` (the highest number already issued
/// in `year`), or the first number of the year.
pub fn next_invoice_number(year: i32, last: Option<&str>) -> String {
    let prefix = year.to_string();
    let seq = last
        .and_then(|n| n.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.parse::<u32>().ok())
        .unwrap_or(0);
    format!("{}{:04}", prefix, seq + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(q: &str, p: &str) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "Práce".into(),
            quantity: d(q),
            unit: Some("h".into()),
            unit_price: d(p),
        }
    }

    #[test]
    fn test_item_total_rounds_to_cents() {
        assert_eq!(item_total(d("3"), d("333.333")), Some(d("1000.00")));
        assert_eq!(item_total(d("0.5"), d("0.05")), Some(d("0.03")));
        assert_eq!(item_total(d("1.5"), d("250")), Some(d("375")));
    }

    #[test]
    fn test_item_total_overflow_is_none() {
        let huge = item("1000000000000000", "1000000000000000");
        assert_eq!(huge.total(), None);
        assert_eq!(invoice_total(&[item("1", "10"), huge]), None);
        assert_eq!(
            invoice_total(&[item("1", "79228162514264337593543950335"), item("1", "1")]),
            None
        );
    }

    #[test]
    fn test_invoice_total_is_sum_of_rounded_items() {
        let items = vec![item("1", "0.005"), item("1", "0.005"), item("2", "100")];
        // each 0.005 rounds to 0.01 before summing
        assert_eq!(invoice_total(&items), Some(d("200.02")));
        assert_eq!(invoice_total(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_next_invoice_number() {
        assert_eq!(next_invoice_number(2024, None), "20240001");
        assert_eq!(next_invoice_number(2024, Some("20240041")), "20240042");
        assert_eq!(next_invoice_number(2025, Some("20249999")), "20250001");
        assert_eq!(next_invoice_number(2024, Some("FV-17")), "20240001");
    }

    #[test]
    fn test_next_invoice_number_past_four_digits() {
        assert_eq!(next_invoice_number(2026, Some("20269999")), "202610000");
        assert_eq!(next_invoice_number(2026, Some("202610000")), "202610001");
    }

    #[test]
    fn test_update_tells_null_from_absent() {
        let update: InvoiceUpdate =
            serde_json::from_str(r#"{"taxable_date":null,"notes":"Splatné převodem"}"#).unwrap();
        assert_eq!(update.taxable_date, Some(None));
        assert_eq!(update.variable_symbol, None);
        assert_eq!(update.notes, Some(Some("Splatné převodem".into())));
    }

    #[test]
    fn test_create_validation_checks_items() {
        let mut req = InvoiceCreate {
            customer_id: 1,
            invoice_number: None,
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            taxable_date: None,
            variable_symbol: None,
            currency: Some("CZK".into()),
            notes: None,
            items: vec![item("1", "100")],
        };
        assert!(req.validate().is_ok());
        req.items[0].description.clear();
        assert!(req.validate().is_err());
    }
}
