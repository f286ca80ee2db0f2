//! Bulk CSV import: partial acceptance, report shapes, and the
//! cache refreshes that follow a successful upload.

use tally_core::ImportKind;
use tally_engine::Controller;
use tally_integration_tests::MockRemote;

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_import_keeps_good_rows_and_reports_bad_ones() {
    let remote = MockRemote::start().await;
    remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    // Row 3 references a category that does not exist.
    let csv = "\
name,brand,price,description,category_id
Espresso beans,Acme,49.90,,1
Moka pot,Bialetti,249.90,,1
Orphan,Acme,9.90,,99
Grinder,Baratza,799.00,,1
Filter papers,Hario,19.90,,1
";

    let outcome = controller
        .import_csv(ImportKind::Product, "products.csv", csv.as_bytes().to_vec())
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.report.created, 4);
    assert_eq!(outcome.report.skipped, 1);
    assert_eq!(outcome.report.errors.len(), 1);
    assert_eq!(
        outcome.report.errors[0].to_string(),
        "row 3: unknown category"
    );

    // The follow-up refresh makes the accepted rows visible.
    assert!(outcome.refreshed);
    assert_eq!(controller.products().len(), 4);
    assert!(controller.products().iter().all(|p| p.name != "Orphan"));
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_import_skips_duplicates() {
    let remote = MockRemote::start().await;
    remote.seed_category("Drinks");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    let csv = "\
name
Drinks
Snacks
Cleaning
";

    let outcome = controller
        .import_csv(ImportKind::Category, "categories.csv", csv.as_bytes().to_vec())
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.report.created, 2);
    assert_eq!(outcome.report.skipped, 1);
    assert!(outcome.refreshed);
    assert_eq!(controller.categories().len(), 3);
}

// ============================================================================
// Sales
// ============================================================================

#[tokio::test]
async fn test_sales_import_tolerates_flat_report_and_reselects_newest_year() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2023, 1, 1, "10.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.selected_year(), Some(2023));

    // The sales endpoint answers the flat {created, skipped} body.
    let csv = "\
year,month,quantity,total_price
2024,1,10,100.00
2024,2,20,200.00
not-a-year,1,1,1.00
";

    let outcome = controller
        .import_csv(ImportKind::Sales, "sales_2024.csv", csv.as_bytes().to_vec())
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.report.created, 2);
    assert_eq!(outcome.report.skipped, 1);
    assert!(outcome.report.errors.is_empty());
    assert!(outcome.refreshed);

    // An import can introduce a new year; the newest one gets selected
    // and its summary loaded.
    assert_eq!(controller.years(), &[2023, 2024]);
    assert_eq!(controller.selected_year(), Some(2024));
    let series = controller.series();
    assert_eq!(series.month(1).expect("month 1 exists").quantity, 10);
    assert_eq!(series.month(2).expect("month 2 exists").quantity, 20);
}
