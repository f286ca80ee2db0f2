//! Monthly sales commands.
//!
//! # Usage
//!
//! ```bash
//! # Dense 12-month table for one year, or across all years
//! tally sales summary --year 2024
//! tally sales summary
//!
//! # Years with recorded sales
//! tally sales years
//!
//! # Override January 2024
//! tally sales override --year 2024 --month 1 --quantity 10 --total 999,90
//!
//! # Export rows as CSV
//! tally sales export --year 2024 -o ./sales_2024.csv
//! ```

use std::path::{Path, PathBuf};

use tally_core::format_brl;
use tally_engine::remote::sales::sales_csv_filename;
use tally_engine::{Controller, build_series};

use super::CliError;

/// Print the dense 12-month summary table.
pub async fn summary(year: Option<i32>) -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let rows = client.sales_summary(year).await?;
    let series = build_series(&rows);

    match year {
        Some(year) => println!("Sales for {year}"),
        None => println!("Sales across all years"),
    }
    println!("{:<10} {:>8} {:>16} {:>16}", "MONTH", "QTY", "TOTAL", "VARIATION");
    for entry in &series {
        println!(
            "{:<10} {:>8} {:>16} {:>16}",
            entry.label,
            entry.quantity,
            format_brl(entry.total),
            format_brl(entry.profit),
        );
    }
    Ok(())
}

/// List the years that have recorded sales.
pub async fn years() -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let years = client.sales_years().await?;

    if years.is_empty() {
        println!("No sales recorded.");
        return Ok(());
    }
    for year in years {
        println!("{year}");
    }
    Ok(())
}

/// Override one month's quantity and total for a year.
///
/// The year must already have recorded sales; inputs are validated
/// locally before anything is sent.
pub async fn override_month(
    year: i32,
    month: u8,
    quantity: &str,
    total: &str,
) -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let mut controller = Controller::new(client);
    controller.load_initial().await;

    controller.select_year(Some(year));
    if controller.selected_year() != Some(year) {
        return Err(CliError::InvalidInput(format!(
            "no sales recorded for {year}"
        )));
    }

    let outcome = controller.override_sales(month, quantity, total).await?;
    if !outcome.refreshed {
        tracing::warn!("override applied but the summary re-fetch failed");
    }

    match controller.series().month(month) {
        Some(entry) => println!(
            "{} {year}: {} sold, {}",
            entry.label,
            entry.quantity,
            format_brl(entry.total)
        ),
        None => println!("Override applied."),
    }
    Ok(())
}

/// Download sales rows as CSV, scoped to `year` when given.
pub async fn export(year: Option<i32>, output: Option<&Path>) -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let bytes = client.download_sales_csv(year).await?;

    let path = output.map_or_else(|| PathBuf::from(sales_csv_filename(year)), Path::to_path_buf);
    std::fs::write(&path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "sales exported");
    Ok(())
}
