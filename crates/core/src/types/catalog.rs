//! Catalog entities: products and categories.
//!
//! These mirror the remote service's wire representation. Entities carry
//! remote-assigned identifiers; draft types carry the payload for create
//! and update calls and never contain an identifier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::PriceValue;

/// A product as held in the remote catalog.
///
/// `price` is kept in its wire shape ([`PriceValue`]) because the remote
/// may deliver it as a number or as text in either decimal convention;
/// normalize before any arithmetic or ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: PriceValue,
    pub description: String,
    /// Non-owning reference; referential integrity is enforced by the
    /// remote at save time, not by the client.
    pub category_id: CategoryId,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub category_id: CategoryId,
    pub price: Decimal,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDraft {
    pub name: String,
}
