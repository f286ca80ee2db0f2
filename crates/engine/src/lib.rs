//! Tally Engine - catalog & sales administration client.
//!
//! This crate is the reusable, UI-independent core of the Tally
//! administration client. It keeps a local cache of products, categories,
//! and monthly sales consistent with the remote catalog service across
//! create/update/delete/import operations, and computes the derived
//! views the interface renders.
//!
//! # Architecture
//!
//! - [`remote`] - Typed REST client for the catalog/sales service. The
//!   only module (together with [`import`]) that performs I/O.
//! - [`controller`] - The [`Controller`] owns the four cache slices
//!   (products, categories, year-scoped sales, year index) and is their
//!   sole writer.
//! - [`catalog`] - Pure filtered/sorted/paginated catalog view.
//! - [`sales`] - Pure dense 12-month series aggregation.
//! - [`import`] - Bulk CSV upload and response interpretation.
//!
//! Derived views are plain functions of cache state plus transient
//! parameters; recomputation is the caller's explicit "recompute on
//! these inputs" responsibility, there is no hidden reactivity.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_engine::{Controller, EngineConfig, RemoteClient};
//!
//! let config = EngineConfig::from_env()?;
//! let client = RemoteClient::new(&config)?;
//! let mut controller = Controller::new(client);
//!
//! controller.load_initial().await;
//! let view = controller.view(&query);
//! let series = controller.series();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod import;
pub mod remote;
pub mod sales;

pub use catalog::{CatalogPage, CatalogQuery, PriceOrder};
pub use config::{ConfigError, EngineConfig};
pub use controller::{Controller, RefreshOutcome, SalesTicket};
pub use error::EngineError;
pub use import::{ImportError, ImportOutcome};
pub use remote::{RemoteClient, RemoteError};
pub use sales::{MonthEntry, SalesSeries, build_series};
