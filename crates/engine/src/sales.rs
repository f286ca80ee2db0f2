//! Pure sales aggregation: sparse monthly rows into a dense 12-month
//! series for charting.
//!
//! The aggregator only fills gaps and orders the series. It never
//! computes `profit_variation` - that is the remote's responsibility and
//! the value is copied through verbatim.

use rust_decimal::Decimal;

use tally_core::MonthlySales;

/// Month labels, January first, for chart axes and tables.
pub const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One month of the dense series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthEntry {
    /// Calendar month, 1-12.
    pub month: u8,
    pub label: &'static str,
    pub quantity: u64,
    pub total: Decimal,
    pub profit: Decimal,
}

/// A dense series of exactly 12 entries, one per calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSeries {
    entries: [MonthEntry; 12],
}

impl SalesSeries {
    /// All 12 entries, January first.
    #[must_use]
    pub const fn entries(&self) -> &[MonthEntry; 12] {
        &self.entries
    }

    /// Entry for a calendar month (1-12), if the month number is valid.
    #[must_use]
    pub fn month(&self, month: u8) -> Option<&MonthEntry> {
        if (1..=12).contains(&month) {
            self.entries.get(usize::from(month) - 1)
        } else {
            None
        }
    }

    /// Iterate the entries in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = &MonthEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a SalesSeries {
    type Item = &'a MonthEntry;
    type IntoIter = std::slice::Iter<'a, MonthEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build the dense 12-month series from sparse rows.
///
/// Absent months are all-zero. Present months are copied verbatim. Rows
/// with a month number outside 1-12 are ignored. Stable under repeated
/// calls with identical input.
#[must_use]
pub fn build_series(rows: &[MonthlySales]) -> SalesSeries {
    let entries = std::array::from_fn(|index| {
        #[allow(clippy::cast_possible_truncation)]
        let month = (index + 1) as u8;
        let row = rows.iter().find(|r| r.month == month);
        #[allow(clippy::indexing_slicing)] // index < 12 by construction
        let label = MONTH_LABELS[index];
        row.map_or(
            MonthEntry {
                month,
                label,
                quantity: 0,
                total: Decimal::ZERO,
                profit: Decimal::ZERO,
            },
            |row| MonthEntry {
                month,
                label,
                quantity: row.quantity,
                total: row.total_price,
                profit: row.profit_variation,
            },
        )
    });

    SalesSeries { entries }
}
