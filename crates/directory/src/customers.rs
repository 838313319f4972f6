//! Customer directory trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CustomerId;

use crate::DirectoryError;
use crate::http;

/// Read-only lookup against the customer-management service.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns true if the customer exists.
    async fn exists(&self, id: CustomerId) -> Result<bool, DirectoryError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    missing: HashSet<CustomerId>,
    unavailable: bool,
}

/// In-memory customer directory for testing.
///
/// Every id exists unless explicitly marked missing; `set_unavailable`
/// simulates a failing remote service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryCustomerDirectory {
    /// Creates a directory in which every customer exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a customer id as unknown.
    pub fn mark_missing(&self, id: CustomerId) {
        self.state.write().unwrap().missing.insert(id);
    }

    /// Makes every lookup fail with a server error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn exists(&self, id: CustomerId) -> Result<bool, DirectoryError> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(DirectoryError::Server {
                status: 503,
                message: "customer directory unavailable".to_string(),
            });
        }
        Ok(!state.missing.contains(&id))
    }
}

/// Customer directory backed by the remote customer-management service.
#[derive(Debug, Clone)]
pub struct HttpCustomerDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomerDirectory {
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
impl CustomerDirectory for HttpCustomerDirectory {
    async fn exists(&self, id: CustomerId) -> Result<bool, DirectoryError> {
        http::check(&self.client, &self.base_url, "api/v1/customers", id.as_uuid()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn everything_exists_by_default() {
        let directory = InMemoryCustomerDirectory::new();
        assert!(directory.exists(CustomerId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn missing_customer_is_reported() {
        let directory = InMemoryCustomerDirectory::new();
        let id = CustomerId::new();
        directory.mark_missing(id);

        assert!(!directory.exists(id).await.unwrap());
        assert!(directory.exists(CustomerId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn unavailable_directory_errors() {
        let directory = InMemoryCustomerDirectory::new();
        directory.set_unavailable(true);

        let err = directory.exists(CustomerId::new()).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Server { status: 503, .. }));
    }
}
