//! Product directory trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;

use crate::DirectoryError;
use crate::http;

/// Read-only lookup against the product-management service.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    /// Returns true if the product exists.
    async fn exists(&self, id: ProductId) -> Result<bool, DirectoryError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    missing: HashSet<ProductId>,
    unavailable: bool,
}

/// In-memory product directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryProductDirectory {
    /// Creates a directory in which every product exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a product id as unknown.
    pub fn mark_missing(&self, id: ProductId) {
        self.state.write().unwrap().missing.insert(id);
    }

    /// Makes every lookup fail with a server error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl ProductDirectory for InMemoryProductDirectory {
    async fn exists(&self, id: ProductId) -> Result<bool, DirectoryError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(DirectoryError::Server {
                status: 503,
                message: "product directory unavailable".to_string(),
            });
        }
        Ok(!state.missing.contains(&id))
    }
}

/// Product directory backed by the remote product-management service.
#[derive(Debug, Clone)]
pub struct HttpProductDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProductDirectory {
    /// Creates a client against the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProductDirectory for HttpProductDirectory {
    async fn exists(&self, id: ProductId) -> Result<bool, DirectoryError> {
        http::check(&self.client, &self.base_url, "api/v1/products", id.as_uuid()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_product_is_reported() {
        let directory = InMemoryProductDirectory::new();
        let id = ProductId::new();
        directory.mark_missing(id);

        assert!(!directory.exists(id).await.unwrap());
        assert!(directory.exists(ProductId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn unavailable_directory_errors() {
        let directory = InMemoryProductDirectory::new();
        directory.set_unavailable(true);
        assert!(directory.exists(ProductId::new()).await.is_err());
    }
}
