//! HTTP directory client tests against a mock peer service.

use common::{CustomerId, ProductId, ShopId};
use directory::{
    CustomerDirectory, DirectoryError, HttpCustomerDirectory, HttpProductDirectory,
    HttpShopDirectory, ProductDirectory, ShopDirectory,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn existing_customer_resolves() {
    let server = MockServer::start().await;
    let id = CustomerId::new();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/customers/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": id})))
        .mount(&server)
        .await;

    let directory = HttpCustomerDirectory::new(server.uri());
    assert!(directory.exists(id).await.unwrap());
}

#[tokio::test]
async fn missing_shop_is_not_an_error() {
    let server = MockServer::start().await;
    let id = ShopId::new();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/shops/{id}")))
        .respond_with(ResponseTemplate::new(404).set_body_string("shop not found"))
        .mount(&server)
        .await;

    let directory = HttpShopDirectory::new(server.uri());
    assert!(!directory.exists(id).await.unwrap());
}

#[tokio::test]
async fn client_error_carries_body() {
    let server = MockServer::start().await;
    let id = ProductId::new();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/products/{id}")))
        .respond_with(ResponseTemplate::new(403).set_body_string("token expired"))
        .mount(&server)
        .await;

    let directory = HttpProductDirectory::new(server.uri());
    let err = directory.exists(id).await.unwrap_err();
    match err {
        DirectoryError::Client { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "token expired");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_surfaced() {
    let server = MockServer::start().await;
    let id = CustomerId::new();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/customers/{id}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let directory = HttpCustomerDirectory::new(server.uri());
    let err = directory.exists(id).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Server { status: 500, .. }));
    assert_eq!(err.to_string(), "Server error: boom");
}

#[tokio::test]
async fn unreachable_directory_is_a_transport_error() {
    // Nothing listens on this port.
    let directory = HttpCustomerDirectory::new("http://127.0.0.1:9");
    let err = directory.exists(CustomerId::new()).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Transport(_)));
}
