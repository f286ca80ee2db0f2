//! Monthly sales rows as reported by the remote summary endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month's aggregated sales for a given year.
///
/// Rows are sparse: the remote only reports months with data. The engine
/// densifies them into a fixed 12-entry series for charting.
///
/// `profit_variation` is computed by the remote (its semantics are the
/// remote's business - observed to be a month-over-month delta of
/// `total_price`, but the engine carries it through unchanged and never
/// recomputes it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Calendar month, 1-12.
    pub month: u8,
    pub quantity: u64,
    pub total_price: Decimal,
    #[serde(default)]
    pub profit_variation: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_variation_defaults_to_zero() {
        let json = r#"{"month": 2, "quantity": 5, "total_price": 120.5}"#;
        let row: MonthlySales = serde_json::from_str(json).unwrap();
        assert_eq!(row.profit_variation, Decimal::ZERO);
    }
}
