use reqwest::StatusCode;
use uuid::Uuid;

use crate::DirectoryError;

/// Performs an existence lookup against `{base_url}/{path}/{id}`.
///
/// 2xx means the resource exists, 404 that it does not; any other outcome is
/// an error carrying the response body.
pub(crate) async fn check(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
    id: Uuid,
) -> Result<bool, DirectoryError> {
    let url = format!("{}/{path}/{id}", base_url.trim_end_matches('/'));
    let response = client.get(&url).send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(true);
    }
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    if status.is_client_error() {
        Err(DirectoryError::Client {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(DirectoryError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
