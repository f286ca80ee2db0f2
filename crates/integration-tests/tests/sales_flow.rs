//! Sales cache flow: year selection, dense series, overrides, and
//! out-of-order response handling.

use std::str::FromStr;

use rust_decimal::Decimal;
use tally_engine::{Controller, EngineError};
use tally_integration_tests::MockRemote;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("test amount must parse")
}

// ============================================================================
// Initial load & the dense series
// ============================================================================

#[tokio::test]
async fn test_initial_load_selects_most_recent_year() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2022, 3, 1, "10.00");
    remote.seed_sale(2024, 1, 2, "20.00");
    remote.seed_sale(2023, 7, 3, "30.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    assert_eq!(controller.years(), &[2022, 2023, 2024]);
    assert_eq!(controller.selected_year(), Some(2024));
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_series_is_dense_with_zero_filled_months() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2024, 1, 10, "100.00");
    remote.seed_sale(2024, 3, 5, "50.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    let series = controller.series();
    assert_eq!(series.entries().len(), 12);

    let january = series.month(1).expect("month 1 exists");
    assert_eq!(january.quantity, 10);
    assert_eq!(january.total, dec("100.00"));

    let february = series.month(2).expect("month 2 exists");
    assert_eq!(february.label, "February");
    assert_eq!(february.quantity, 0);
    assert_eq!(february.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_profit_variation_is_month_over_month_delta() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2024, 1, 1, "100.00");
    remote.seed_sale(2024, 2, 1, "150.00");

    let rows = remote
        .client()
        .sales_summary(Some(2024))
        .await
        .expect("summary should succeed");
    let february = rows
        .iter()
        .find(|row| row.month == 2)
        .expect("February row exists");
    assert_eq!(february.profit_variation, dec("50.00"));
}

// ============================================================================
// Month override
// ============================================================================

#[tokio::test]
async fn test_override_january_round_trips_through_summary() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2024, 1, 3, "300.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.selected_year(), Some(2024));

    let outcome = controller
        .override_sales(1, "10", "999,90")
        .await
        .expect("override should succeed");
    assert!(outcome.refreshed);

    let series = controller.series();
    let january = series.month(1).expect("month 1 exists");
    assert_eq!(january.quantity, 10);
    assert_eq!(january.total, dec("999.90"));
}

#[tokio::test]
async fn test_override_validates_locally_before_any_request() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2024, 1, 3, "300.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;

    for (month, quantity, total) in [(1, "ten", "99.90"), (1, "-3", "99.90"), (1, "3", "free"), (13, "3", "99.90")]
    {
        let result = controller.override_sales(month, quantity, total).await;
        assert!(
            matches!(result, Err(EngineError::Validation(_))),
            "expected local rejection for ({month}, {quantity:?}, {total:?})"
        );
    }

    // Nothing reached the server: January still holds the seeded values.
    let series = controller.series();
    let january = series.month(1).expect("month 1 exists");
    assert_eq!(january.quantity, 3);
}

#[tokio::test]
async fn test_override_without_selected_year_is_rejected() {
    let remote = MockRemote::start().await;
    // No sales at all, so no year can be selected.
    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.selected_year(), None);

    let result = controller.override_sales(1, "10", "99.90").await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

// ============================================================================
// Out-of-order responses
// ============================================================================

#[tokio::test]
async fn test_stale_summary_response_is_discarded() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2023, 1, 1, "10.00");
    remote.seed_sale(2024, 1, 2, "20.00");

    let mut controller = Controller::new(remote.client());
    controller.load_initial().await;
    assert_eq!(controller.selected_year(), Some(2024));

    let client = remote.client();

    // A fetch for 2024 starts, then the user switches to 2023 and a
    // second fetch starts before the first resolves.
    let stale_ticket = controller.begin_sales_fetch();
    controller.select_year(Some(2023));
    let fresh_ticket = controller.begin_sales_fetch();

    let stale_rows = client
        .sales_summary(stale_ticket.year())
        .await
        .expect("summary should succeed");
    let fresh_rows = client
        .sales_summary(fresh_ticket.year())
        .await
        .expect("summary should succeed");

    // The fresh response lands first; the stale one arrives later and
    // must not overwrite it.
    assert!(controller.apply_sales_fetch(fresh_ticket, fresh_rows));
    assert!(!controller.apply_sales_fetch(stale_ticket, stale_rows));

    let series = controller.series();
    let january = series.month(1).expect("month 1 exists");
    assert_eq!(january.quantity, 1, "cache must hold the 2023 rows");
}

// ============================================================================
// CSV export
// ============================================================================

#[tokio::test]
async fn test_sales_csv_export_is_year_scoped() {
    let remote = MockRemote::start().await;
    remote.seed_sale(2023, 1, 1, "10.00");
    remote.seed_sale(2024, 1, 2, "20.00");

    let client = remote.client();

    let scoped = client
        .download_sales_csv(Some(2023))
        .await
        .expect("download should succeed");
    let scoped = String::from_utf8(scoped).expect("CSV must be UTF-8");
    assert!(scoped.contains("2023"));
    assert!(!scoped.contains("2024"));

    let all = client
        .download_sales_csv(None)
        .await
        .expect("download should succeed");
    let all = String::from_utf8(all).expect("CSV must be UTF-8");
    assert!(all.contains("2023"));
    assert!(all.contains("2024"));
}
