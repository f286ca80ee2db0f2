//! Typed REST client for the remote catalog/sales service.
//!
//! The remote is the source of record: every mutating operation
//! round-trips through it and the caches are patched only with what it
//! returns. This module holds the transport plumbing; the per-resource
//! surfaces live in [`products`], [`categories`], and [`sales`].
//!
//! # Response shapes
//!
//! The service is not fully consistent about envelopes. Mutations may
//! answer `{success, message, data: T}` or a bare `T`; the client
//! accepts both and treats an explicit `success: false` as a rejection
//! even under a 2xx status.

mod categories;
mod products;
pub mod sales;

pub use products::PRODUCTS_CSV_FILENAME;
pub use sales::sales_csv_filename;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;

/// Errors that can occur when talking to the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failed (connection, timeout, bad TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The remote answered 2xx but flagged the operation as failed.
    #[error("Rejected by remote: {0}")]
    Rejected(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// REST client for the catalog/sales service.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a new client for the configured remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &EngineConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base URL the client was configured with (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a GET request expecting a plain JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, RemoteError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(status_error(status, &Value::String(message)));
        }
        Ok(response.json().await?)
    }

    /// Execute a mutation (POST or PUT) and decode the returned entity,
    /// tolerating both the `{success, data}` envelope and a bare body.
    pub(crate) async fn send_entity<T, B>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let value: Value = response.json().await?;
        decode_entity(status, value)
    }

    /// Execute a DELETE request, checking the `{success}` envelope.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        let response = self.inner.client.delete(self.url(path)).send().await?;
        let status = response.status();
        let value: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(status_error(status, &value));
        }
        if is_flagged_failure(&value) {
            return Err(RemoteError::Rejected(envelope_message(&value)));
        }
        Ok(())
    }

    /// Upload a file as a single-field (`file`) multipart form and return
    /// the raw status plus parsed body for the caller to interpret.
    pub(crate) async fn upload(
        &self,
        path: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(StatusCode, Value), RemoteError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .inner
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let value: Value = response.json().await.unwrap_or(Value::Null);
        Ok((status, value))
    }

    /// Download raw bytes (CSV exports).
    pub(crate) async fn download(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(status_error(status, &Value::String(message)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Decode a mutation response: reject on non-2xx or an explicit
/// `success: false`, then deserialize `data` when present, the whole
/// body otherwise.
fn decode_entity<T: DeserializeOwned>(status: StatusCode, value: Value) -> Result<T, RemoteError> {
    if !status.is_success() {
        return Err(status_error(status, &value));
    }
    if is_flagged_failure(&value) {
        return Err(RemoteError::Rejected(envelope_message(&value)));
    }
    let payload = match value.get("data") {
        Some(data) if !data.is_null() => data.clone(),
        _ => value,
    };
    Ok(serde_json::from_value(payload)?)
}

fn is_flagged_failure(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

fn envelope_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("operation failed")
        .to_string()
}

fn status_error(status: StatusCode, value: &Value) -> RemoteError {
    let message = match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => envelope_message(other),
    };
    RemoteError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Category, CategoryId};

    #[test]
    fn test_decode_enveloped_entity() {
        let value: Value = serde_json::from_str(
            r#"{"success": true, "message": "created", "data": {"id": 1, "name": "Drinks"}}"#,
        )
        .unwrap();
        let category: Category = decode_entity(StatusCode::OK, value).unwrap();
        assert_eq!(category.id, CategoryId::new(1));
        assert_eq!(category.name, "Drinks");
    }

    #[test]
    fn test_decode_bare_entity() {
        let value: Value =
            serde_json::from_str(r#"{"id": 2, "name": "Snacks"}"#).unwrap();
        let category: Category = decode_entity(StatusCode::OK, value).unwrap();
        assert_eq!(category.id, CategoryId::new(2));
    }

    #[test]
    fn test_decode_flagged_failure() {
        let value: Value = serde_json::from_str(
            r#"{"success": false, "message": "category name already exists"}"#,
        )
        .unwrap();
        let result: Result<Category, _> = decode_entity(StatusCode::OK, value);
        assert!(matches!(
            result,
            Err(RemoteError::Rejected(message)) if message.contains("already exists")
        ));
    }

    #[test]
    fn test_decode_non_success_status() {
        let value: Value =
            serde_json::from_str(r#"{"message": "not found"}"#).unwrap();
        let result: Result<Category, _> = decode_entity(StatusCode::NOT_FOUND, value);
        assert!(matches!(
            result,
            Err(RemoteError::Status { status: 404, .. })
        ));
    }
}
