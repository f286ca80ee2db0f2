//! Tally Core - Shared types library.
//!
//! This crate provides the common types used across the Tally components:
//! - `engine` - Cache reconciliation, derived views, bulk import
//! - `cli` - Operator command-line interface
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This
//! keeps it lightweight and allows it to be used anywhere, including the
//! pure derived-view code that must stay free of hidden state.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog entities, sales rows, price values,
//!   and import reports

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
