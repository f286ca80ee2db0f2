//! Catalog CRUD through the full engine stack.
//!
//! Each test boots its own [`MockRemote`] and drives a real
//! [`Controller`] against it, so the response-envelope tolerance and the
//! cache-patching rules are exercised over actual HTTP.

use std::str::FromStr;

use rust_decimal::Decimal;
use tally_core::{CategoryDraft, CategoryId, ProductDraft};
use tally_engine::{CatalogQuery, Controller, EngineError, PriceOrder, RemoteError};
use tally_integration_tests::MockRemote;

fn draft(name: &str, price: &str, category: CategoryId) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        brand: "Acme".to_string(),
        description: String::new(),
        category_id: category,
        price: Decimal::from_str(price).expect("test price must parse"),
    }
}

// ============================================================================
// Product create / update / delete
// ============================================================================

#[tokio::test]
async fn test_created_product_appears_once_with_server_id() {
    let remote = MockRemote::start().await;
    let category = remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert!(controller.products().is_empty());

    let saved = controller
        .save_product(&draft("Espresso beans", "49.90", category), None)
        .await
        .expect("create should succeed");

    // The cached entity is the server's, id included, and appears once.
    assert_eq!(controller.products().len(), 1);
    assert_eq!(controller.products()[0].id, saved.id);
    assert_eq!(remote.product_count(), 1);
}

#[tokio::test]
async fn test_update_replaces_in_place_without_duplicating() {
    let remote = MockRemote::start().await;
    let category = remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    let first = controller
        .save_product(&draft("Espresso beans", "49.90", category), None)
        .await
        .expect("create should succeed");
    controller
        .save_product(&draft("Moka pot", "249.90", category), None)
        .await
        .expect("create should succeed");

    let updated = controller
        .save_product(&draft("Espresso beans 1kg", "89.90", category), Some(first.id))
        .await
        .expect("update should succeed");

    assert_eq!(controller.products().len(), 2);
    assert_eq!(updated.id, first.id);
    let cached = controller
        .products()
        .iter()
        .find(|p| p.id == first.id)
        .expect("updated product must stay cached");
    assert_eq!(cached.name, "Espresso beans 1kg");
}

#[tokio::test]
async fn test_flagged_failure_leaves_cache_untouched() {
    let remote = MockRemote::start().await;
    remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    // 2xx with success: false must surface as a rejection.
    let result = controller
        .save_product(&draft("Orphan", "9.90", CategoryId::new(999)), None)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Remote(RemoteError::Rejected(_)))
    ));
    assert!(controller.products().is_empty());
}

#[tokio::test]
async fn test_delete_removes_product_and_reconciles_sales() {
    let remote = MockRemote::start().await;
    let category = remote.seed_category("Drinks");
    remote.seed_sale(2024, 1, 5, "100.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.selected_year(), Some(2024));

    let saved = controller
        .save_product(&draft("Espresso beans", "49.90", category), None)
        .await
        .expect("create should succeed");

    let outcome = controller
        .delete_product(saved.id)
        .await
        .expect("delete should succeed");

    assert!(outcome.refreshed);
    assert!(controller.products().is_empty());
    assert_eq!(remote.product_count(), 0);
    // The year still has rows, so the selection survives the re-index.
    assert_eq!(controller.selected_year(), Some(2024));
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_first_created_category_becomes_default() {
    let remote = MockRemote::start().await;

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.default_category(), None);

    let drinks = controller
        .save_category(
            &CategoryDraft {
                name: "Drinks".to_string(),
            },
            None,
        )
        .await
        .expect("create should succeed");
    assert_eq!(controller.default_category(), Some(drinks.id));

    controller
        .save_category(
            &CategoryDraft {
                name: "Snacks".to_string(),
            },
            None,
        )
        .await
        .expect("create should succeed");
    // A later creation does not steal the default slot.
    assert_eq!(controller.default_category(), Some(drinks.id));
}

#[tokio::test]
async fn test_duplicate_category_name_is_rejected() {
    let remote = MockRemote::start().await;
    remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    let result = controller
        .save_category(
            &CategoryDraft {
                name: "Drinks".to_string(),
            },
            None,
        )
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Remote(RemoteError::Rejected(message))) if message.contains("exists")
    ));
    assert_eq!(controller.categories().len(), 1);
}

// ============================================================================
// Catalog view over live data
// ============================================================================

#[tokio::test]
async fn test_view_orders_legacy_text_prices_and_ranks_unparsable_last() {
    let remote = MockRemote::start().await;
    let category = remote.seed_category("Drinks");
    remote.seed_product("Cheap", "Acme", "R$ 5,50", category);
    remote.seed_product("Dear", "Acme", "249.90", category);
    remote.seed_product("Mystery", "Acme", "call for price", category);

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    let mut query = CatalogQuery::new(10);
    query.set_price_order(PriceOrder::Descending);
    let view = controller.view(&query);

    let names: Vec<&str> = view.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Dear", "Cheap", "Mystery"]);
}

#[tokio::test]
async fn test_products_csv_export() {
    let remote = MockRemote::start().await;
    let category = remote.seed_category("Drinks");
    remote.seed_product("Espresso beans", "Acme", "49.90", category);

    let bytes = remote
        .client()
        .download_products_csv()
        .await
        .expect("download should succeed");
    let text = String::from_utf8(bytes).expect("CSV must be UTF-8");
    assert!(text.starts_with("id,name,brand,price"));
    assert!(text.contains("Espresso beans"));
}
