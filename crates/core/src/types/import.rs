//! Bulk CSV import reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which entity collection a CSV import targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Product,
    Category,
    Sales,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "products"),
            Self::Category => write!(f, "categories"),
            Self::Sales => write!(f, "sales"),
        }
    }
}

/// A per-record failure reported by a bulk import, identified by the
/// input row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: u64,
    pub error: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}

/// Aggregate outcome of a bulk CSV import.
///
/// `created` and `skipped` are trusted verbatim from the remote; the
/// client never marks a row created on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// Row errors rendered for display, bounded to the first `limit`
    /// lines with a trailing remainder count.
    #[must_use]
    pub fn error_lines(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .iter()
            .take(limit)
            .map(ToString::to_string)
            .collect();
        let remainder = self.errors.len().saturating_sub(limit);
        if remainder > 0 {
            lines.push(format!("... and {remainder} more"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_errors(n: u64) -> ImportReport {
        ImportReport {
            created: 0,
            skipped: n,
            errors: (1..=n)
                .map(|row| RowError {
                    row,
                    error: "bad row".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_row_error_rendering() {
        let err = RowError {
            row: 3,
            error: "unknown category".to_string(),
        };
        assert_eq!(err.to_string(), "row 3: unknown category");
    }

    #[test]
    fn test_error_lines_bounded() {
        let report = report_with_errors(8);
        let lines = report.error_lines(5);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "row 1: bad row");
        assert_eq!(lines[5], "... and 3 more");
    }

    #[test]
    fn test_error_lines_under_limit() {
        let report = report_with_errors(2);
        assert_eq!(report.error_lines(5).len(), 2);
    }

    #[test]
    fn test_report_deserializes_with_missing_fields() {
        let report: ImportReport =
            serde_json::from_str(r#"{"created": 4, "skipped": 1}"#).unwrap();
        assert_eq!(report.created, 4);
        assert!(report.errors.is_empty());
    }
}
