//! Listener and CORS configuration.
//!
//! Read once at startup from `GALLOP_*` variables; unset variables fall
//! back to local-development defaults.

use std::net::SocketAddr;

use crate::constants::{DEFAULT_API_PORT, DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for the listener and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host or IP to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Origins the dashboard may be served from. Empty allows any origin.
    /// Entries of the form `*.example.org` match HTTPS subdomains.
    pub cors_origins: Vec<String>,

    /// Send `Access-Control-Allow-Credentials` for listed origins.
    pub cors_allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_API_PORT,
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl ApiConfig {
    /// Load from the environment:
    /// - `GALLOP_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `GALLOP_API_PORT`: Listen port (default: 8000)
    /// - `GALLOP_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `GALLOP_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `GALLOP_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> ApiResult<Self> {
        let bind_host =
            std::env::var("GALLOP_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("GALLOP_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => DEFAULT_API_PORT,
        };

        let cors_origins = std::env::var("GALLOP_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("GALLOP_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("GALLOP_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
        })
    }

    /// Resolve the listen address.
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// True once an origin allow-list is configured.
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Match an `Origin` header value against the allow-list.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.org
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain
                        .strip_suffix(pattern)
                        .is_some_and(|sub| sub.ends_with('.'));
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.port, DEFAULT_API_PORT);
    }

    #[test]
    fn test_socket_addr() -> ApiResult<()> {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr()?.port(), 9000);

        let bad = ApiConfig {
            bind_host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(bad.socket_addr().is_err());
        Ok(())
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(!config.is_production());
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: vec![
                "https://gallop.example.org".to_string(),
                "*.maps.example.org".to_string(),
            ],
            ..Default::default()
        };

        assert!(config.is_production());
        assert!(config.is_origin_allowed("https://gallop.example.org"));
        assert!(config.is_origin_allowed("https://us.maps.example.org"));
        assert!(!config.is_origin_allowed("https://evilmaps.example.org"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }
}
