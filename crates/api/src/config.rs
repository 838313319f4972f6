//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string; in-memory store when unset
/// - `CUSTOMER_SERVICE_URL` / `SHOP_SERVICE_URL` / `PRODUCT_SERVICE_URL` —
///   peer directory base URLs; permissive in-memory directories when unset
/// - `JWT_SECRET` — bearer-token signing secret; all permissions granted when
///   unset (dev mode)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub customer_service_url: Option<String>,
    pub shop_service_url: Option<String>,
    pub product_service_url: Option<String>,
    pub jwt_secret: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            customer_service_url: std::env::var("CUSTOMER_SERVICE_URL").ok(),
            shop_service_url: std::env::var("SHOP_SERVICE_URL").ok(),
            product_service_url: std::env::var("PRODUCT_SERVICE_URL").ok(),
            jwt_secret: std::env::var("JWT_SECRET").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the directory base URLs when all three are configured.
    pub fn directory_urls(&self) -> Option<(&str, &str, &str)> {
        match (
            self.customer_service_url.as_deref(),
            self.shop_service_url.as_deref(),
            self.product_service_url.as_deref(),
        ) {
            (Some(customers), Some(shops), Some(products)) => Some((customers, shops, products)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            customer_service_url: None,
            shop_service_url: None,
            product_service_url: None,
            jwt_secret: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn directory_urls_require_all_three() {
        let mut config = Config {
            customer_service_url: Some("http://customers".to_string()),
            shop_service_url: Some("http://shops".to_string()),
            ..Config::default()
        };
        assert!(config.directory_urls().is_none());

        config.product_service_url = Some("http://products".to_string());
        let (customers, shops, products) = config.directory_urls().unwrap();
        assert_eq!(customers, "http://customers");
        assert_eq!(shops, "http://shops");
        assert_eq!(products, "http://products");
    }
}
