//! Reconciliation controller: the sole writer of the local caches.
//!
//! The [`Controller`] owns four cache slices - products, categories,
//! sales rows for the selected year, and the year index - and keeps them
//! consistent with the remote across every mutating operation. It never
//! guesses: caches are patched only with entities the remote returned,
//! or replaced wholesale by a re-fetch.
//!
//! # Concurrency model
//!
//! Single logical writer, cooperative scheduling. Reactive fetches keyed
//! by the selected year are made supersedable with a generation counter:
//! [`Controller::begin_sales_fetch`] hands out a [`SalesTicket`] and
//! bumps the generation, and [`Controller::apply_sales_fetch`] writes the
//! result only if no newer ticket (or year change) happened in between.
//! A stale response is discarded on arrival and can never overwrite a
//! fresher one. The sequential convenience wrapper
//! [`Controller::refresh_sales`] runs the same path.

use tracing::{debug, instrument, warn};

use tally_core::{
    Category, CategoryDraft, CategoryId, ImportKind, MonthlySales, PriceValue, Product,
    ProductDraft, ProductId,
};

use crate::catalog::{CatalogPage, CatalogQuery, compute_view};
use crate::error::EngineError;
use crate::import::{self, ImportOutcome};
use crate::remote::RemoteClient;
use crate::sales::{SalesSeries, build_series};

/// Permission to write one sales-summary fetch result into the cache.
///
/// Issued by [`Controller::begin_sales_fetch`]; invalidated by any later
/// ticket or year change.
#[derive(Debug, Clone, Copy)]
pub struct SalesTicket {
    year: Option<i32>,
    epoch: u64,
}

impl SalesTicket {
    /// The year this fetch is scoped to (`None` = unscoped).
    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Outcome of a mutation whose secondary refresh is best-effort.
///
/// `refreshed: false` is the partial-refresh case: the primary mutation
/// succeeded and is kept, only the dependent re-fetch is stale. It must
/// not be reported as an operation failure.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOutcome {
    pub refreshed: bool,
}

/// Owner and sole writer of the local cache slices.
pub struct Controller {
    client: RemoteClient,
    products: Vec<Product>,
    categories: Vec<Category>,
    sales: Vec<MonthlySales>,
    years: Vec<i32>,
    selected_year: Option<i32>,
    /// Default category for a fresh product form; backfilled by the
    /// first category fetch and by category creation when still unset.
    default_category: Option<CategoryId>,
    loading: bool,
    sales_epoch: u64,
}

impl Controller {
    /// Create a controller with empty caches.
    #[must_use]
    pub const fn new(client: RemoteClient) -> Self {
        Self {
            client,
            products: Vec::new(),
            categories: Vec::new(),
            sales: Vec::new(),
            years: Vec::new(),
            selected_year: None,
            default_category: None,
            loading: false,
            sales_epoch: 0,
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn sales(&self) -> &[MonthlySales] {
        &self.sales
    }

    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    #[must_use]
    pub const fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    #[must_use]
    pub const fn default_category(&self) -> Option<CategoryId> {
        self.default_category
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current catalog view for the given query parameters.
    #[must_use]
    pub fn view(&self, query: &CatalogQuery) -> CatalogPage {
        compute_view(&self.products, query)
    }

    /// Dense 12-month series for the cached sales rows.
    #[must_use]
    pub fn series(&self) -> SalesSeries {
        build_series(&self.sales)
    }

    /// Shared handle to the remote client (CSV downloads and other
    /// read-only calls that bypass the caches).
    #[must_use]
    pub const fn client(&self) -> &RemoteClient {
        &self.client
    }

    // =========================================================================
    // Initial load
    // =========================================================================

    /// Fetch products, categories, and the year index concurrently, then
    /// the sales summary for the defaulted year.
    ///
    /// Any slice whose request fails keeps its previous value (empty on
    /// first load); the failure is logged, not surfaced. The loading flag
    /// clears once all three requests have settled.
    #[instrument(skip(self))]
    pub async fn load_initial(&mut self) {
        self.loading = true;

        let (products, categories, years) = tokio::join!(
            self.client.list_products(),
            self.client.list_categories(),
            self.client.sales_years(),
        );

        match products {
            Ok(products) => self.products = products,
            Err(error) => warn!(%error, "initial product fetch failed"),
        }

        match categories {
            Ok(categories) => {
                self.categories = categories;
                if self.default_category.is_none() {
                    self.default_category = self.categories.first().map(|c| c.id);
                }
            }
            Err(error) => warn!(%error, "initial category fetch failed"),
        }

        match years {
            Ok(years) => {
                self.years = years;
                if self.selected_year.is_none() {
                    self.selected_year = self.years.last().copied();
                }
            }
            Err(error) => warn!(%error, "initial year index fetch failed"),
        }

        self.loading = false;

        self.refresh_sales().await;
    }

    // =========================================================================
    // Sales-for-year cache
    // =========================================================================

    /// Change the selected year.
    ///
    /// The year must be a member of the year index (or `None`); an
    /// unknown year is ignored so the selection invariant holds. Any
    /// in-flight sales fetch is superseded.
    pub fn select_year(&mut self, year: Option<i32>) {
        if let Some(year) = year {
            if !self.years.contains(&year) {
                warn!(year, "ignoring selection of year absent from index");
                return;
            }
        }
        self.selected_year = year;
        self.sales_epoch += 1;
    }

    /// Start a supersedable sales-summary fetch for the current
    /// selection. Any ticket issued earlier becomes stale.
    pub const fn begin_sales_fetch(&mut self) -> SalesTicket {
        self.sales_epoch += 1;
        SalesTicket {
            year: self.selected_year,
            epoch: self.sales_epoch,
        }
    }

    /// Write a fetched summary into the cache, unless the ticket was
    /// superseded in the meantime. Returns whether the write happened.
    pub fn apply_sales_fetch(&mut self, ticket: SalesTicket, rows: Vec<MonthlySales>) -> bool {
        if ticket.epoch == self.sales_epoch {
            self.sales = rows;
            true
        } else {
            debug!(
                year = ?ticket.year,
                "discarding stale sales response (superseded)"
            );
            false
        }
    }

    /// Sequential refresh of the sales cache for the current selection.
    ///
    /// Best-effort: a failed fetch keeps the previous rows and logs.
    /// Returns whether the cache was actually replaced.
    #[instrument(skip(self))]
    pub async fn refresh_sales(&mut self) -> bool {
        let ticket = self.begin_sales_fetch();
        match self.client.sales_summary(ticket.year()).await {
            Ok(rows) => self.apply_sales_fetch(ticket, rows),
            Err(error) => {
                warn!(%error, year = ?ticket.year(), "sales refresh failed; keeping previous rows");
                false
            }
        }
    }

    // =========================================================================
    // Product mutations
    // =========================================================================

    /// Create (`existing: None`) or update a product.
    ///
    /// On success the cache is patched with exactly the entity the remote
    /// returned - never the submitted draft. On failure the cache is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`EngineError::Remote`] on transport failure, a non-success
    /// status, or an explicit failure flag.
    #[instrument(skip(self, draft), fields(name = %draft.name, existing = ?existing))]
    pub async fn save_product(
        &mut self,
        draft: &ProductDraft,
        existing: Option<ProductId>,
    ) -> Result<Product, EngineError> {
        let saved = match existing {
            Some(id) => self.client.update_product(id, draft).await?,
            None => self.client.create_product(draft).await?,
        };
        self.absorb_product(saved.clone(), existing.is_some());
        Ok(saved)
    }

    /// Delete a product. The caller is responsible for prior explicit
    /// confirmation; this operation does not ask.
    ///
    /// On success the product is removed from the cache, then the sales
    /// summary and year index are re-fetched (a delete can retroactively
    /// change aggregates). If the selected year disappeared from the
    /// index, the most recent remaining year is selected instead.
    ///
    /// # Errors
    ///
    /// [`EngineError::Remote`] when the delete itself fails; a failed
    /// secondary refresh only yields `refreshed: false`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&mut self, id: ProductId) -> Result<RefreshOutcome, EngineError> {
        self.client.delete_product(id).await?;
        self.products.retain(|p| p.id != id);

        let refreshed = self.refresh_years_then_sales(false).await;
        Ok(RefreshOutcome { refreshed })
    }

    // =========================================================================
    // Category mutations
    // =========================================================================

    /// Create (`existing: None`) or update a category.
    ///
    /// A newly created category backfills the default-category slot when
    /// it was still unset.
    ///
    /// # Errors
    ///
    /// [`EngineError::Remote`] on transport failure, a non-success
    /// status, or an explicit failure flag.
    #[instrument(skip(self, draft), fields(name = %draft.name, existing = ?existing))]
    pub async fn save_category(
        &mut self,
        draft: &CategoryDraft,
        existing: Option<CategoryId>,
    ) -> Result<Category, EngineError> {
        let saved = match existing {
            Some(id) => self.client.update_category(id, draft).await?,
            None => self.client.create_category(draft).await?,
        };
        self.absorb_category(saved.clone(), existing.is_some());
        Ok(saved)
    }

    // =========================================================================
    // Sales mutations
    // =========================================================================

    /// Override one month's quantity and total for the selected year.
    ///
    /// Both raw inputs must parse as non-negative numbers; otherwise the
    /// operation is rejected locally before any network call. On success
    /// the year's summary is re-fetched rather than patched, since the
    /// remote may recompute adjacent months' profit variation.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for bad input or no selected year;
    /// [`EngineError::Remote`] when the override call fails.
    #[instrument(skip(self))]
    pub async fn override_sales(
        &mut self,
        month: u8,
        quantity_raw: &str,
        total_raw: &str,
    ) -> Result<RefreshOutcome, EngineError> {
        let year = self
            .selected_year
            .ok_or_else(|| EngineError::Validation("select a year before editing sales".into()))?;
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be 1-12, got {month}"
            )));
        }
        let quantity: u64 = quantity_raw.trim().parse().map_err(|_| {
            EngineError::Validation(format!(
                "quantity must be a non-negative integer, got {quantity_raw:?}"
            ))
        })?;
        let total = PriceValue::Text(total_raw.to_string())
            .normalize()
            .filter(|t| !t.is_sign_negative())
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "total must be a non-negative number, got {total_raw:?}"
                ))
            })?;

        self.client
            .override_sales(year, month, quantity, total)
            .await?;

        let refreshed = self.refresh_sales().await;
        Ok(RefreshOutcome { refreshed })
    }

    // =========================================================================
    // Bulk import
    // =========================================================================

    /// Upload a CSV for `kind` and, on success, refresh exactly the
    /// affected cache slices: products or categories for those kinds;
    /// for sales, the year index (reselecting the most recent year, since
    /// an import can introduce new years) and the scoped summary.
    ///
    /// # Errors
    ///
    /// [`EngineError::Import`] when the upload fails or the remote
    /// refuses it; no cache is refreshed in that case.
    #[instrument(skip(self, bytes), fields(kind = %kind))]
    pub async fn import_csv(
        &mut self,
        kind: ImportKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportOutcome, EngineError> {
        let report = import::upload_csv(&self.client, kind, filename, bytes).await?;

        let refreshed = match kind {
            ImportKind::Product => match self.client.list_products().await {
                Ok(products) => {
                    self.products = products;
                    true
                }
                Err(error) => {
                    warn!(%error, "product refresh after import failed");
                    false
                }
            },
            ImportKind::Category => match self.client.list_categories().await {
                Ok(categories) => {
                    self.categories = categories;
                    if self.default_category.is_none() {
                        self.default_category = self.categories.first().map(|c| c.id);
                    }
                    true
                }
                Err(error) => {
                    warn!(%error, "category refresh after import failed");
                    false
                }
            },
            ImportKind::Sales => self.refresh_years_then_sales(true).await,
        };

        Ok(ImportOutcome { report, refreshed })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn absorb_product(&mut self, saved: Product, existing: bool) {
        if existing {
            if let Some(slot) = self.products.iter_mut().find(|p| p.id == saved.id) {
                *slot = saved;
            }
        } else {
            self.products.push(saved);
        }
    }

    fn absorb_category(&mut self, saved: Category, existing: bool) {
        if existing {
            if let Some(slot) = self.categories.iter_mut().find(|c| c.id == saved.id) {
                *slot = saved;
            }
        } else {
            if self.default_category.is_none() {
                self.default_category = Some(saved.id);
            }
            self.categories.push(saved);
        }
    }

    /// Secondary refresh after a mutation that can move aggregates:
    /// re-fetch the year index, reconcile the selection, then re-fetch
    /// the scoped summary. `force_most_recent` reselects the newest year
    /// even when the current selection is still valid (sales import).
    async fn refresh_years_then_sales(&mut self, force_most_recent: bool) -> bool {
        let mut refreshed = true;

        match self.client.sales_years().await {
            Ok(years) => {
                self.years = years;
                let keep = self
                    .selected_year
                    .filter(|y| !force_most_recent && self.years.contains(y));
                self.selected_year = keep.or_else(|| self.years.last().copied());
                // Selection may have moved; supersede in-flight fetches.
                self.sales_epoch += 1;
            }
            Err(error) => {
                warn!(%error, "year index refresh failed; keeping previous index");
                refreshed = false;
            }
        }

        refreshed & self.refresh_sales().await
    }
}
