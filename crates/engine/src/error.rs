//! Engine-level error taxonomy.
//!
//! Three failure classes cross the engine boundary:
//!
//! - [`EngineError::Validation`] - bad input detected locally, before any
//!   network call is made.
//! - [`EngineError::Remote`] / [`EngineError::Import`] - the remote call
//!   failed (transport, non-success status, or an explicit failure flag);
//!   caches are left untouched and the operation is abandoned.
//!
//! Partial refresh failures (a secondary re-fetch after a successful
//! primary mutation) are deliberately NOT errors: the primary effect is
//! kept, the stale refresh is logged, and the outcome struct of the
//! operation reports `refreshed: false`.

use thiserror::Error;

use crate::import::ImportError;
use crate::remote::RemoteError;

/// Errors surfaced by [`crate::controller::Controller`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Locally detected bad input; no network call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote call failed; caches are unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A bulk import failed; caches are unchanged.
    #[error(transparent)]
    Import(#[from] ImportError),
}
