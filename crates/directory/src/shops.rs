//! Shop directory trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ShopId;

use crate::DirectoryError;
use crate::http;

/// Read-only lookup against the shop-management service.
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    /// Returns true if the shop exists.
    async fn exists(&self, id: ShopId) -> Result<bool, DirectoryError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    missing: HashSet<ShopId>,
    unavailable: bool,
}

/// In-memory shop directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShopDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryShopDirectory {
    /// Creates a directory in which every shop exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a shop id as unknown.
    pub fn mark_missing(&self, id: ShopId) {
        self.state.write().unwrap().missing.insert(id);
    }

    /// Makes every lookup fail with a server error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl ShopDirectory for InMemoryShopDirectory {
    async fn exists(&self, id: ShopId) -> Result<bool, DirectoryError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(DirectoryError::Server {
                status: 503,
                message: "shop directory unavailable".to_string(),
            });
        }
        Ok(!state.missing.contains(&id))
    }
}

/// Shop directory backed by the remote shop-management service.
#[derive(Debug, Clone)]
pub struct HttpShopDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpShopDirectory {
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
impl ShopDirectory for HttpShopDirectory {
    async fn exists(&self, id: ShopId) -> Result<bool, DirectoryError> {
        http::check(&self.client, &self.base_url, "api/v1/shops", id.as_uuid()).await
    }
}
