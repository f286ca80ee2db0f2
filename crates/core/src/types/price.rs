//! Price values as they arrive from the remote catalog service.
//!
//! The remote is not consistent about price representation: a product's
//! `price` field can be a JSON number, or text using either `.` or `,`
//! as the decimal separator (legacy rows imported from spreadsheets).
//! [`PriceValue`] captures both shapes verbatim and [`PriceValue::normalize`]
//! turns them into a canonical [`Decimal`] when possible.
//!
//! Normalization failure is a signal value (`None`), never a panic:
//! callers must fall back to displaying the original text and must not
//! attempt arithmetic on the value.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price as delivered by the remote: numeric or free-form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    /// Already numeric.
    Number(Decimal),
    /// Textual, possibly using `,` as the decimal separator.
    Text(String),
}

impl PriceValue {
    /// Normalize into a canonical decimal value.
    ///
    /// Numeric input is returned unchanged. Text is stripped of any
    /// character that is not a digit, comma, dot, or minus sign, then:
    ///
    /// - both `,` and `.` present: dots are thousands separators
    ///   (removed) and the comma is the decimal point;
    /// - only `,` present: the comma is the decimal point;
    /// - otherwise: parsed as-is.
    ///
    /// Returns `None` when the text does not parse as a number.
    #[must_use]
    pub fn normalize(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(raw) => normalize_text(raw),
        }
    }

    /// Render for display using the fixed BRL convention.
    ///
    /// Falls back to the raw original text when normalization fails.
    #[must_use]
    pub fn display(&self) -> String {
        match (self.normalize(), self) {
            (Some(value), _) => format_brl(value),
            (None, Self::Text(raw)) => raw.clone(),
            // Number(_) always normalizes
            (None, Self::Number(value)) => value.to_string(),
        }
    }
}

impl From<Decimal> for PriceValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

fn normalize_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let canonical = if has_comma && has_dot {
        cleaned.replace('.', "").replace(',', ".")
    } else if has_comma {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    Decimal::from_str(&canonical).ok()
}

/// Format a normalized value using the fixed pt-BR / BRL convention:
/// `R$ 1.234,56` (grouping `.`, decimal `,`, two decimal places).
#[must_use]
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{f:0<2}")),
        None => (text, "00".to_string()),
    };

    // Group integer digits in threes with '.'
    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_numeric_passthrough() {
        let price = PriceValue::Number(dec("19.90"));
        assert_eq!(price.normalize(), Some(dec("19.90")));
    }

    #[test]
    fn test_comma_decimal() {
        let price = PriceValue::Text("10,50".to_string());
        assert_eq!(price.normalize(), Some(dec("10.50")));
    }

    #[test]
    fn test_mixed_separators() {
        // Dot as thousands separator, comma as decimal separator.
        let price = PriceValue::Text("1.234,56".to_string());
        assert_eq!(price.normalize(), Some(dec("1234.56")));
    }

    #[test]
    fn test_plain_dot_decimal() {
        let price = PriceValue::Text("1234.56".to_string());
        assert_eq!(price.normalize(), Some(dec("1234.56")));
    }

    #[test]
    fn test_currency_noise_stripped() {
        let price = PriceValue::Text("R$ 99,90".to_string());
        assert_eq!(price.normalize(), Some(dec("99.90")));
    }

    #[test]
    fn test_unparsable_is_signal_value() {
        let price = PriceValue::Text("call for price".to_string());
        assert_eq!(price.normalize(), None);
        // Display falls back to the raw text untouched.
        assert_eq!(price.display(), "call for price");
    }

    #[test]
    fn test_both_conventions_agree() {
        let comma = PriceValue::Text("1.234,56".to_string());
        let dot = PriceValue::Text("1234.56".to_string());
        assert_eq!(comma.normalize(), dot.normalize());
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(format_brl(dec("0.5")), "R$ 0,50");
        assert_eq!(format_brl(dec("1000000")), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec("-42.1")), "-R$ 42,10");
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        for raw in ["1.234,56", "1234.56", "10,5", "0.01"] {
            let original = PriceValue::Text(raw.to_string());
            let normalized = original.normalize().unwrap();
            let re =
                PriceValue::Text(format_brl(normalized)).normalize().unwrap();
            assert_eq!(re, normalized.round_dp(2), "failed for {raw}");
        }
    }

    #[test]
    fn test_serde_untagged_shapes() {
        let number: PriceValue = serde_json::from_str("19.9").unwrap();
        assert!(matches!(number, PriceValue::Number(_)));

        let text: PriceValue = serde_json::from_str("\"19,90\"").unwrap();
        assert!(matches!(text, PriceValue::Text(_)));
        assert_eq!(text.normalize(), Some(dec("19.90")));
    }
}
