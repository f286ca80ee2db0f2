//! End-to-end tests for the Tally engine.
//!
//! The tests in `tests/` run the real engine (`RemoteClient`,
//! `Controller`, import pipeline) against [`MockRemote`], an in-process
//! axum server that mimics the catalog/sales service, including its
//! inconsistent response envelopes:
//!
//! - product creation answers a bare entity, updates answer the
//!   `{success, message, data}` envelope;
//! - category creation answers the envelope, updates answer bare;
//! - product/category uploads answer a nested report, the sales upload
//!   answers a flat `{created, skipped}` body;
//! - a domain rejection is a 2xx with `success: false`.
//!
//! No external services or credentials are required; each test starts
//! its own server on an ephemeral port.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

use tally_core::{Category, CategoryId, MonthlySales, PriceValue, Product, ProductId};
use tally_engine::{EngineConfig, RemoteClient};

// ============================================================================
// Server state
// ============================================================================

#[derive(Debug, Clone)]
struct SaleRow {
    year: i32,
    month: u8,
    quantity: u64,
    total_price: Decimal,
}

#[derive(Debug, Default)]
struct ServerState {
    products: Vec<Product>,
    categories: Vec<Category>,
    sales: Vec<SaleRow>,
    next_product_id: i64,
    next_category_id: i64,
}

impl ServerState {
    fn category_exists(&self, id: CategoryId) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }
}

type Shared = Arc<Mutex<ServerState>>;

// ============================================================================
// Harness
// ============================================================================

/// An in-process stand-in for the remote catalog/sales service.
///
/// Dropped servers are aborted; each test should start its own.
pub struct MockRemote {
    base_url: String,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockRemote {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics when the listener cannot be bound (test environment only).
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(ServerState::default()));
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock remote");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let task = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                tracing::error!(%error, "mock remote stopped");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Engine configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics when the bound address is not a valid URL (never in practice).
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(Url::parse(&self.base_url).expect("mock base URL must parse"))
    }

    /// A real engine client pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics when the HTTP client fails to build.
    #[must_use]
    pub fn client(&self) -> RemoteClient {
        RemoteClient::new(&self.config()).expect("Failed to build engine client")
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Seed a category directly into server state.
    pub fn seed_category(&self, name: &str) -> CategoryId {
        let mut state = self.lock();
        state.next_category_id += 1;
        let id = CategoryId::new(state.next_category_id);
        state.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Seed a product. The price is stored verbatim as text, matching
    /// the legacy rows the real service serves.
    pub fn seed_product(&self, name: &str, brand: &str, price: &str, category: CategoryId) -> ProductId {
        let mut state = self.lock();
        state.next_product_id += 1;
        let id = ProductId::new(state.next_product_id);
        state.products.push(Product {
            id,
            name: name.to_string(),
            brand: brand.to_string(),
            price: PriceValue::Text(price.to_string()),
            description: String::new(),
            category_id: category,
        });
        id
    }

    /// Seed one monthly sales row.
    ///
    /// # Panics
    ///
    /// Panics when `total` is not a parsable amount.
    pub fn seed_sale(&self, year: i32, month: u8, quantity: u64, total: &str) {
        let total_price = PriceValue::Text(total.to_string())
            .normalize()
            .expect("seeded total must parse");
        self.lock().sales.push(SaleRow {
            year,
            month,
            quantity,
            total_price,
        });
    }

    /// Number of products currently stored server-side.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }
}

impl Drop for MockRemote {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Router & handlers
// ============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/products/csv", get(products_csv))
        .route("/products/upload", post(upload_products))
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/categories/upload", post(upload_categories))
        .route("/sales/years", get(sales_years))
        .route("/sales/summary", get(sales_summary))
        .route("/sales/override/{year}/{month}", put(override_sales))
        .route("/sales/csv", get(sales_csv))
        .route("/sales/upload", post(upload_sales))
        .with_state(state)
}

fn lock(state: &Shared) -> MutexGuard<'_, ServerState> {
    state.lock().expect("mock state poisoned")
}

#[derive(Deserialize)]
struct ProductBody {
    name: String,
    brand: String,
    #[serde(default)]
    description: String,
    category_id: i64,
    price: Decimal,
}

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    Json(json!(lock(&state).products))
}

// Bare entity on success, flagged failure under 2xx on a bad category.
async fn create_product(
    State(state): State<Shared>,
    Json(body): Json<ProductBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let category = CategoryId::new(body.category_id);
    if !state.category_exists(category) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "unknown category"})),
        );
    }
    state.next_product_id += 1;
    let product = Product {
        id: ProductId::new(state.next_product_id),
        name: body.name,
        brand: body.brand,
        price: PriceValue::Number(body.price),
        description: body.description,
        category_id: category,
    };
    state.products.push(product.clone());
    (StatusCode::CREATED, Json(json!(product)))
}

// Enveloped entity on success.
async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let id = ProductId::new(id);
    let Some(slot) = state.products.iter_mut().find(|p| p.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "product not found"})),
        );
    };
    slot.name = body.name;
    slot.brand = body.brand;
    slot.price = PriceValue::Number(body.price);
    slot.description = body.description;
    slot.category_id = CategoryId::new(body.category_id);
    let product = slot.clone();
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "updated", "data": product})),
    )
}

async fn delete_product(
    State(state): State<Shared>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let id = ProductId::new(id);
    let before = state.products.len();
    state.products.retain(|p| p.id != id);
    if state.products.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "product not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "deleted"})),
    )
}

async fn products_csv(State(state): State<Shared>) -> String {
    let state = lock(&state);
    let mut out = String::from("id,name,brand,price,description,category_id\n");
    for p in &state.products {
        let price = p
            .price
            .normalize()
            .map_or_else(|| p.price.display(), |d| d.to_string());
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.id, p.name, p.brand, price, p.description, p.category_id
        ));
    }
    out
}

async fn list_categories(State(state): State<Shared>) -> Json<Value> {
    Json(json!(lock(&state).categories))
}

#[derive(Deserialize)]
struct CategoryBody {
    name: String,
}

// Enveloped entity on success.
async fn create_category(
    State(state): State<Shared>,
    Json(body): Json<CategoryBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    if state.categories.iter().any(|c| c.name == body.name) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "category name already exists"})),
        );
    }
    state.next_category_id += 1;
    let category = Category {
        id: CategoryId::new(state.next_category_id),
        name: body.name,
    };
    state.categories.push(category.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "created", "data": category})),
    )
}

// Bare entity on success.
async fn update_category(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let id = CategoryId::new(id);
    let Some(slot) = state.categories.iter_mut().find(|c| c.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "category not found"})),
        );
    };
    slot.name = body.name;
    let category = slot.clone();
    (StatusCode::OK, Json(json!(category)))
}

// ============================================================================
// Sales handlers
// ============================================================================

async fn sales_years(State(state): State<Shared>) -> Json<Value> {
    let state = lock(&state);
    let mut years: Vec<i32> = state.sales.iter().map(|row| row.year).collect();
    years.sort_unstable();
    years.dedup();
    Json(json!(years))
}

#[derive(Deserialize)]
struct SummaryParams {
    year: Option<i32>,
}

async fn sales_summary(
    State(state): State<Shared>,
    Query(params): Query<SummaryParams>,
) -> Json<Value> {
    let state = lock(&state);
    Json(json!(aggregate(&state.sales, params.year)))
}

/// Aggregate rows into sparse per-month totals with a month-over-month
/// revenue delta, the way the real service computes `profit_variation`.
fn aggregate(rows: &[SaleRow], year: Option<i32>) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<u8, (u64, Decimal)> = BTreeMap::new();
    for row in rows {
        if year.is_some_and(|y| y != row.year) {
            continue;
        }
        let entry = by_month.entry(row.month).or_insert((0, Decimal::ZERO));
        entry.0 += row.quantity;
        entry.1 += row.total_price;
    }

    let mut previous: Option<Decimal> = None;
    by_month
        .into_iter()
        .map(|(month, (quantity, total_price))| {
            let profit_variation = previous.map_or(Decimal::ZERO, |prev| total_price - prev);
            previous = Some(total_price);
            MonthlySales {
                month,
                quantity,
                total_price,
                profit_variation,
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct OverrideBody {
    quantity: u64,
    total_price: Decimal,
}

// Replaces the month's rows outright and answers the stored row bare.
async fn override_sales(
    State(state): State<Shared>,
    Path((year, month)): Path<(i32, u8)>,
    Json(body): Json<OverrideBody>,
) -> (StatusCode, Json<Value>) {
    if !(1..=12).contains(&month) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "month out of range"})),
        );
    }
    let mut state = lock(&state);
    state
        .sales
        .retain(|row| !(row.year == year && row.month == month));
    state.sales.push(SaleRow {
        year,
        month,
        quantity: body.quantity,
        total_price: body.total_price,
    });
    (
        StatusCode::OK,
        Json(json!({
            "month": month,
            "quantity": body.quantity,
            "total_price": body.total_price,
            "profit_variation": 0
        })),
    )
}

async fn sales_csv(
    State(state): State<Shared>,
    Query(params): Query<SummaryParams>,
) -> String {
    let state = lock(&state);
    let mut out = String::from("year,month,quantity,total_price\n");
    for row in &state.sales {
        if params.year.is_some_and(|y| y != row.year) {
            continue;
        }
        out.push_str(&format!(
            "{},{},{},{}\n",
            row.year, row.month, row.quantity, row.total_price
        ));
    }
    out
}

// ============================================================================
// CSV uploads
// ============================================================================

async fn read_file_field(multipart: &mut Multipart) -> Option<Vec<u8>> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            return field.bytes().await.ok().map(|b| b.to_vec());
        }
    }
    None
}

fn data_rows(bytes: &[u8]) -> Vec<(u64, Vec<String>)> {
    let text = String::from_utf8_lossy(bytes);
    text.lines()
        .skip(1) // header
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let fields = line.split(',').map(|f| f.trim().to_string()).collect();
            (i as u64 + 1, fields)
        })
        .collect()
}

fn missing_file() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "missing file field"})),
    )
}

// Nested report: {success, message, data: {created, skipped, errors}}.
async fn upload_products(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let Some(bytes) = read_file_field(&mut multipart).await else {
        return missing_file();
    };

    let mut state = lock(&state);
    let (mut created, mut skipped) = (0u64, 0u64);
    let mut errors = Vec::new();

    // name,brand,price,description,category_id
    for (row, fields) in data_rows(&bytes) {
        let parsed = match fields.as_slice() {
            [name, brand, price, description, category] => {
                let price = PriceValue::Text(price.clone()).normalize();
                let category = category.parse::<i64>().ok().map(CategoryId::new);
                match (price, category) {
                    (Some(price), Some(category)) if state.category_exists(category) => {
                        Some((name.clone(), brand.clone(), price, description.clone(), category))
                    }
                    (None, _) => {
                        errors.push(json!({"row": row, "error": "invalid price"}));
                        None
                    }
                    _ => {
                        errors.push(json!({"row": row, "error": "unknown category"}));
                        None
                    }
                }
            }
            _ => {
                errors.push(json!({"row": row, "error": "wrong column count"}));
                None
            }
        };
        match parsed {
            Some((name, brand, price, description, category_id)) => {
                state.next_product_id += 1;
                let id = ProductId::new(state.next_product_id);
                state.products.push(Product {
                    id,
                    name,
                    brand,
                    price: PriceValue::Number(price),
                    description,
                    category_id,
                });
                created += 1;
            }
            None => skipped += 1,
        }
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "import finished",
            "data": {"created": created, "skipped": skipped, "errors": errors}
        })),
    )
}

// Nested report, same shape as products.
async fn upload_categories(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let Some(bytes) = read_file_field(&mut multipart).await else {
        return missing_file();
    };

    let mut state = lock(&state);
    let (mut created, mut skipped) = (0u64, 0u64);
    let mut errors = Vec::new();

    // name
    for (row, fields) in data_rows(&bytes) {
        let Some(name) = fields.first().filter(|n| !n.is_empty()) else {
            errors.push(json!({"row": row, "error": "empty name"}));
            skipped += 1;
            continue;
        };
        if state.categories.iter().any(|c| &c.name == name) {
            errors.push(json!({"row": row, "error": "duplicate category"}));
            skipped += 1;
            continue;
        }
        state.next_category_id += 1;
        let id = CategoryId::new(state.next_category_id);
        state.categories.push(Category {
            id,
            name: name.clone(),
        });
        created += 1;
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "import finished",
            "data": {"created": created, "skipped": skipped, "errors": errors}
        })),
    )
}

// Flat report, the older endpoint shape: {created, skipped}.
async fn upload_sales(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let Some(bytes) = read_file_field(&mut multipart).await else {
        return missing_file();
    };

    let mut state = lock(&state);
    let (mut created, mut skipped) = (0u64, 0u64);

    // year,month,quantity,total_price
    for (_, fields) in data_rows(&bytes) {
        let parsed = match fields.as_slice() {
            [year, month, quantity, total] => {
                let year = year.parse::<i32>().ok();
                let month = month.parse::<u8>().ok().filter(|m| (1..=12).contains(m));
                let quantity = quantity.parse::<u64>().ok();
                let total = PriceValue::Text(total.clone()).normalize();
                match (year, month, quantity, total) {
                    (Some(y), Some(m), Some(q), Some(t)) => Some((y, m, q, t)),
                    _ => None,
                }
            }
            _ => None,
        };
        match parsed {
            Some((year, month, quantity, total_price)) => {
                state.sales.push(SaleRow {
                    year,
                    month,
                    quantity,
                    total_price,
                });
                created += 1;
            }
            None => skipped += 1,
        }
    }

    (
        StatusCode::OK,
        Json(json!({"created": created, "skipped": skipped})),
    )
}
