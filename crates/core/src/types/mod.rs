//! Core types for Tally.
//!
//! This module provides type-safe wrappers for the catalog and sales
//! domain concepts.

pub mod catalog;
pub mod id;
pub mod import;
pub mod price;
pub mod sales;

pub use catalog::{Category, CategoryDraft, Product, ProductDraft};
pub use id::*;
pub use import::{ImportKind, ImportReport, RowError};
pub use price::{PriceValue, format_brl};
pub use sales::MonthlySales;
