//! Pure catalog view: filter, sort, paginate.
//!
//! [`compute_view`] is a deterministic function of its inputs - no
//! caching, no hidden state. The [`CatalogQuery`] setters encode the two
//! pagination rules the interface relies on: changing any filter or the
//! sort order resets to page 1, and a requested page past the end is
//! clamped to the last page.

use rust_decimal::Decimal;

use tally_core::{CategoryId, Product};

use crate::config::DEFAULT_PAGE_SIZE;

/// Sort direction for the normalized product price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter, sort, and page parameters for the catalog view.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    name_query: String,
    category: Option<CategoryId>,
    price_order: PriceOrder,
    page: usize,
    page_size: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogQuery {
    /// Create an unconstrained query starting at page 1.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            name_query: String::new(),
            category: None,
            price_order: PriceOrder::Ascending,
            page: 1,
            page_size,
        }
    }

    /// Set the case-insensitive name substring filter. Resets to page 1.
    pub fn set_name_query(&mut self, query: impl Into<String>) {
        self.name_query = query.into();
        self.page = 1;
    }

    /// Set the exact-match category filter. Resets to page 1.
    pub fn set_category(&mut self, category: Option<CategoryId>) {
        self.category = category;
        self.page = 1;
    }

    /// Set the price sort direction. Resets to page 1.
    pub fn set_price_order(&mut self, order: PriceOrder) {
        self.price_order = order;
        self.page = 1;
    }

    /// Request a page (1-based). Values below 1 become 1; values past the
    /// last page are clamped by [`compute_view`].
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    #[must_use]
    pub fn name_query(&self) -> &str {
        &self.name_query
    }

    #[must_use]
    pub const fn category(&self) -> Option<CategoryId> {
        self.category
    }

    #[must_use]
    pub const fn price_order(&self) -> PriceOrder {
        self.price_order
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category_id != category {
                return false;
            }
        }
        let needle = self.name_query.trim().to_lowercase();
        if !needle.is_empty() && !product.name.to_lowercase().contains(&needle) {
            return false;
        }
        true
    }
}

/// One page of the filtered and sorted catalog.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    /// The page actually shown (after clamping), 1-based.
    pub page: usize,
    /// `ceil(filtered / page_size)`; 0 when the filtered set is empty.
    pub total_pages: usize,
}

impl CatalogPage {
    const fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 0,
        }
    }
}

/// Compute the paginated catalog view for the given source list and
/// query parameters.
///
/// Sorting is stable: products whose price fails normalization rank as
/// the lowest price, and ties keep their relative input order.
#[must_use]
pub fn compute_view(products: &[Product], query: &CatalogQuery) -> CatalogPage {
    if query.page_size == 0 {
        return CatalogPage::empty();
    }

    let mut filtered: Vec<&Product> =
        products.iter().filter(|p| query.matches(p)).collect();

    filtered.sort_by(|a, b| {
        let a = sort_key(a);
        let b = sort_key(b);
        match query.price_order {
            PriceOrder::Ascending => a.cmp(&b),
            PriceOrder::Descending => b.cmp(&a),
        }
    });

    let total_pages = filtered.len().div_ceil(query.page_size);
    if total_pages == 0 {
        return CatalogPage::empty();
    }

    let page = query.page.clamp(1, total_pages);
    let items = filtered
        .iter()
        .skip((page - 1) * query.page_size)
        .take(query.page_size)
        .map(|p| (*p).clone())
        .collect();

    CatalogPage {
        items,
        page,
        total_pages,
    }
}

fn sort_key(product: &Product) -> Decimal {
    product.price.normalize().unwrap_or(Decimal::MIN)
}
