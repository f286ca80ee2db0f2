//! Bulk CSV import command.
//!
//! # Usage
//!
//! ```bash
//! tally import products ./products.csv
//! tally import categories ./categories.csv
//! tally import sales ./sales_2024.csv
//! ```
//!
//! Per-row failures do not abort the upload: the remote keeps the rows
//! it accepted and reports the rest, so a partial import is a normal
//! outcome, not an error.

use std::path::Path;

use tally_core::ImportKind;
use tally_engine::import::upload_csv;

use super::CliError;

const MAX_ERROR_LINES: usize = 5;

pub async fn run(kind: ImportKind, file: &Path) -> Result<(), CliError> {
    let bytes = std::fs::read(file)?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.csv");

    let (_, client) = super::client()?;
    tracing::info!(%kind, file = %file.display(), bytes = bytes.len(), "uploading");

    let report = upload_csv(&client, kind, filename, bytes).await?;

    println!(
        "Imported {}: {} created, {} skipped",
        kind, report.created, report.skipped
    );
    for line in report.error_lines(MAX_ERROR_LINES) {
        println!("  {line}");
    }
    Ok(())
}
