//! Peer directory clients.
//!
//! The lifecycle engine validates customer, shop, and product references
//! through these read-only lookups. Each directory is a remote service; the
//! HTTP implementations surface every non-success response as an error, and
//! the in-memory implementations provide failure-injection knobs for tests.

pub mod customers;
pub mod error;
mod http;
pub mod products;
pub mod shops;

pub use customers::{CustomerDirectory, HttpCustomerDirectory, InMemoryCustomerDirectory};
pub use error::DirectoryError;
pub use products::{HttpProductDirectory, InMemoryProductDirectory, ProductDirectory};
pub use shops::{HttpShopDirectory, InMemoryShopDirectory, ShopDirectory};
