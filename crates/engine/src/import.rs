//! Bulk CSV import pipeline.
//!
//! Drives a multipart upload to the entity-specific bulk endpoint and
//! interprets the structured response. The remote is authoritative: the
//! created/skipped counts are trusted verbatim, and no client-side row
//! is considered created until a subsequent cache refresh shows it.
//!
//! # Body shapes
//!
//! Product and category uploads answer
//! `{success, message, data: {created, skipped, errors: [{row, error}]}}`.
//! The sales upload may answer the same shape or a flat
//! `{created, skipped}`; both are accepted.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use tally_core::{ImportKind, ImportReport, RowError};

use crate::remote::{RemoteClient, RemoteError};

/// Errors from a bulk CSV import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Transport-level failure; nothing is known about the rows.
    #[error(transparent)]
    Transport(#[from] RemoteError),

    /// The remote refused the import (non-success status or an explicit
    /// `success: false`). Row-level errors, when reported, ride along.
    #[error("Import rejected: {message}")]
    Rejected {
        message: String,
        errors: Vec<RowError>,
    },
}

impl ImportError {
    /// Row-level errors reported by the remote, if any.
    #[must_use]
    pub fn row_errors(&self) -> &[RowError] {
        match self {
            Self::Transport(_) => &[],
            Self::Rejected { errors, .. } => errors,
        }
    }
}

/// Result of a completed import, including whether the follow-up cache
/// refresh succeeded (`refreshed: false` means the counts are trusted
/// but the local cache is momentarily stale).
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub report: ImportReport,
    pub refreshed: bool,
}

const fn upload_path(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Product => "/products/upload",
        ImportKind::Category => "/categories/upload",
        ImportKind::Sales => "/sales/upload",
    }
}

/// Upload a CSV file to the bulk endpoint for `kind` and interpret the
/// response.
///
/// # Errors
///
/// [`ImportError::Transport`] when the request itself fails;
/// [`ImportError::Rejected`] when the remote refuses the import. In both
/// cases no cache refresh should follow.
#[instrument(skip(client, bytes), fields(kind = %kind, bytes = bytes.len()))]
pub async fn upload_csv(
    client: &RemoteClient,
    kind: ImportKind,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ImportReport, ImportError> {
    let (status, body) = client.upload(upload_path(kind), filename, bytes).await?;
    interpret_response(status, &body)
}

/// Interpret an upload response body against the status policy: failed
/// when the transport status is not successful OR the body's success
/// flag is explicitly false.
fn interpret_response(status: StatusCode, body: &Value) -> Result<ImportReport, ImportError> {
    let flagged_failure = body.get("success").and_then(Value::as_bool) == Some(false);
    if !status.is_success() || flagged_failure {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(
                || format!("upload failed with status {}", status.as_u16()),
                ToString::to_string,
            );
        return Err(ImportError::Rejected {
            message,
            errors: extract_row_errors(body),
        });
    }

    let payload = body.get("data").filter(|d| !d.is_null()).unwrap_or(body);
    Ok(ImportReport {
        created: count_field(payload, "created"),
        skipped: count_field(payload, "skipped"),
        errors: extract_row_errors(body),
    })
}

fn count_field(payload: &Value, field: &str) -> u64 {
    payload.get(field).and_then(Value::as_u64).unwrap_or(0)
}

fn extract_row_errors(body: &Value) -> Vec<RowError> {
    let errors = body
        .get("data")
        .and_then(|d| d.get("errors"))
        .or_else(|| body.get("errors"));
    errors
        .and_then(|e| serde_json::from_value(e.clone()).ok())
        .unwrap_or_default()
}
