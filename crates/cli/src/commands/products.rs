//! Product commands.
//!
//! # Usage
//!
//! ```bash
//! # Page 2 of all "moka" products, most expensive first
//! tally products list --name moka --order desc --page 2
//!
//! # Create, update, delete
//! tally products create --name "Moka pot" --brand Bialetti --price "R$ 249,90" --category 3
//! tally products update 17 --name "Moka pot 6-cup" --brand Bialetti --price 289.90 --category 3
//! tally products delete 17
//!
//! # Export the whole catalog
//! tally products export -o ./products.csv
//! ```

use std::path::Path;

use tally_core::{CategoryId, PriceValue, ProductDraft, ProductId};
use tally_engine::catalog::compute_view;
use tally_engine::remote::PRODUCTS_CSV_FILENAME;
use tally_engine::{CatalogQuery, PriceOrder};

use super::CliError;
use crate::ProductFields;

/// List products with the catalog view's filter, sort, and paging rules.
pub async fn list(
    name: Option<&str>,
    category: Option<CategoryId>,
    order: PriceOrder,
    page: usize,
) -> Result<(), CliError> {
    let (config, client) = super::client()?;
    let products = client.list_products().await?;

    let mut query = CatalogQuery::new(config.page_size);
    if let Some(name) = name {
        query.set_name_query(name);
    }
    query.set_category(category);
    query.set_price_order(order);
    // Paging last: filter changes reset the page.
    query.set_page(page);

    let view = compute_view(&products, &query);
    if view.items.is_empty() {
        println!("No products match.");
        return Ok(());
    }

    println!("{:>6}  {:<30} {:<16} {:>14}  {}", "ID", "NAME", "BRAND", "PRICE", "CATEGORY");
    for product in &view.items {
        println!(
            "{:>6}  {:<30} {:<16} {:>14}  {}",
            product.id,
            product.name,
            product.brand,
            product.price.display(),
            product.category_id,
        );
    }
    println!("Page {} of {}", view.page, view.total_pages);
    Ok(())
}

/// Create (`existing: None`) or update a product from CLI fields.
pub async fn save(fields: &ProductFields, existing: Option<ProductId>) -> Result<(), CliError> {
    let price = PriceValue::Text(fields.price.clone())
        .normalize()
        .filter(|p| !p.is_sign_negative())
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "price must be a non-negative number, got {:?}",
                fields.price
            ))
        })?;

    let draft = ProductDraft {
        name: fields.name.clone(),
        brand: fields.brand.clone(),
        description: fields.description.clone(),
        category_id: CategoryId::new(fields.category),
        price,
    };

    let (_, client) = super::client()?;
    let saved = match existing {
        Some(id) => client.update_product(id, &draft).await?,
        None => client.create_product(&draft).await?,
    };

    println!("Saved product {}: {}", saved.id, saved.name);
    Ok(())
}

/// Delete a product. No confirmation prompt; deletion is immediate.
pub async fn delete(id: ProductId) -> Result<(), CliError> {
    let (_, client) = super::client()?;
    client.delete_product(id).await?;
    println!("Deleted product {id}");
    Ok(())
}

/// Download the product catalog CSV to `output` (default `products.csv`).
pub async fn export(output: Option<&Path>) -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let bytes = client.download_products_csv().await?;

    let path = output.unwrap_or_else(|| Path::new(PRODUCTS_CSV_FILENAME));
    std::fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "catalog exported");
    Ok(())
}
