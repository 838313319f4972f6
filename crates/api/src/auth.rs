//! Bearer-token permission resolution.
//!
//! The shell resolves the caller's granted authorities up front and hands
//! the engine a ready-made [`Authorization`] value; no identity concept
//! leaks past this module. Without a configured secret every request is
//! granted all permissions (dev mode).

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use domain::{Authorization, Permission};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token verification settings.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// HS256 signing secret; `None` disables verification and grants all
    /// permissions.
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Configuration that grants every request all permissions.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Configuration that verifies bearer tokens with the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
}

/// Resolves the caller's authorization from the request headers.
///
/// Authority names that do not correspond to a known permission are ignored
/// rather than rejected, so unrelated claims can share the token.
pub fn resolve(config: &AuthConfig, headers: &HeaderMap) -> Result<Authorization, ApiError> {
    let Some(secret) = &config.jwt_secret else {
        return Ok(Authorization::all());
    };

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

    let granted = data
        .claims
        .permissions
        .iter()
        .filter_map(|name| Permission::parse(name));
    Ok(Authorization::granting(granted))
}
