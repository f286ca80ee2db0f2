//! Category operations against the remote catalog.

use reqwest::Method;
use tracing::instrument;

use tally_core::{Category, CategoryDraft, CategoryId};

use super::{RemoteClient, RemoteError};

impl RemoteClient {
    /// Fetch the full category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, RemoteError> {
        self.get_json("/categories/").await
    }

    /// Create a category and return the remote's representation of it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// explicit `success: false` in the body.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, RemoteError> {
        self.send_entity(Method::POST, "/categories/", draft).await
    }

    /// Update an existing category and return the remote's representation.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_category`].
    #[instrument(skip(self, draft), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RemoteError> {
        self.send_entity(Method::PUT, &format!("/categories/{id}"), draft)
            .await
    }
}
