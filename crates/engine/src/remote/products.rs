//! Product operations against the remote catalog.

use reqwest::Method;
use tracing::instrument;

use tally_core::{Product, ProductDraft, ProductId};

use super::{RemoteClient, RemoteError};

/// Conventional filename for the product CSV export.
pub const PRODUCTS_CSV_FILENAME: &str = "products.csv";

impl RemoteClient {
    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.get_json("/products/").await
    }

    /// Create a product and return the remote's representation of it.
    ///
    /// The returned entity, not the submitted draft, is what belongs in
    /// the cache - the remote owns computed and normalized fields.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// explicit `success: false` in the body.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, RemoteError> {
        self.send_entity(Method::POST, "/products/", draft).await
    }

    /// Update an existing product and return the remote's representation.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_product`].
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RemoteError> {
        self.send_entity(Method::PUT, &format!("/products/{id}"), draft)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// `success: false` envelope.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RemoteError> {
        self.delete(&format!("/products/{id}")).await
    }

    /// Download the product catalog as raw CSV bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn download_products_csv(&self) -> Result<Vec<u8>, RemoteError> {
        self.download("/products/csv").await
    }
}
