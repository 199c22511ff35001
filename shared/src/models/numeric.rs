//! Decimal bounds of the NUMERIC columns
//!
//! PostgreSQL rounds extra fractional digits silently and rejects values
//! with too many integer digits, so inputs are checked before they are bound.

use rust_decimal::Decimal;

/// `NUMERIC(precision, scale)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric {
    pub precision: u32,
    pub scale: u32,
}

/// Invoice item quantity
pub const QUANTITY: Numeric = Numeric::new(12, 3);
/// Prices, totals, budgets and approval amounts
pub const MONEY: Numeric = Numeric::new(14, 2);
/// Hourly rates
pub const RATE: Numeric = Numeric::new(12, 2);

impl Numeric {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Exclusive upper bound of the magnitude
    fn limit(&self) -> Decimal {
        Decimal::from(10i64.pow(self.precision - self.scale))
    }

    /// True when `value` is stored exactly
    pub fn fits(&self, value: Decimal) -> bool {
        value.normalize().scale() <= self.scale && value.abs() < self.limit()
    }
}
