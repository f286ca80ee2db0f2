//! Sales operations against the remote service.

use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use tally_core::MonthlySales;

use super::{RemoteClient, RemoteError};

/// Body for the per-month sales override endpoint.
#[derive(Debug, Serialize)]
struct OverrideBody {
    quantity: u64,
    total_price: Decimal,
}

/// Conventional filename for the sales CSV export:
/// `sales_<year>.csv`, or `sales_all.csv` when unscoped.
#[must_use]
pub fn sales_csv_filename(year: Option<i32>) -> String {
    match year {
        Some(year) => format!("sales_{year}.csv"),
        None => "sales_all.csv".to_string(),
    }
}

impl RemoteClient {
    /// Fetch the ordered list of years with at least one sales record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn sales_years(&self) -> Result<Vec<i32>, RemoteError> {
        self.get_json("/sales/years").await
    }

    /// Fetch the sparse monthly sales rows, optionally scoped to a year.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn sales_summary(&self, year: Option<i32>) -> Result<Vec<MonthlySales>, RemoteError> {
        let path = match year {
            Some(year) => format!("/sales/summary?year={year}"),
            None => "/sales/summary".to_string(),
        };
        self.get_json(&path).await
    }

    /// Overwrite one month's quantity and total for a year.
    ///
    /// The caller must re-fetch the summary afterwards: the remote may
    /// recompute `profit_variation` for adjacent months as a side effect.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// explicit `success: false` in the body.
    #[instrument(skip(self))]
    pub async fn override_sales(
        &self,
        year: i32,
        month: u8,
        quantity: u64,
        total_price: Decimal,
    ) -> Result<(), RemoteError> {
        let body = OverrideBody {
            quantity,
            total_price,
        };
        // The override endpoint returns the stored row; the engine
        // re-fetches the whole summary instead of trusting a local patch.
        let _: serde_json::Value = self
            .send_entity(Method::PUT, &format!("/sales/override/{year}/{month}"), &body)
            .await?;
        Ok(())
    }

    /// Download sales rows as raw CSV bytes, optionally scoped to a year.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn download_sales_csv(&self, year: Option<i32>) -> Result<Vec<u8>, RemoteError> {
        let path = match year {
            Some(year) => format!("/sales/csv?year={year}"),
            None => "/sales/csv".to_string(),
        };
        self.download(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_csv_filename() {
        assert_eq!(sales_csv_filename(Some(2024)), "sales_2024.csv");
        assert_eq!(sales_csv_filename(None), "sales_all.csv");
    }
}
