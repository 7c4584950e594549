// ABOUTME: HTTP-layer configuration for the crisis-detection API server
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

/// Transport-level configuration. Domain tuning (weights, thresholds,
/// breaker, cache) lives in `sentinel_core::ConfigView`; this is just the
/// bind address and request ceilings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,
    pub host: String,
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    #[validate(range(min = 1, max = 10000))]
    pub max_connections: u32,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            request_timeout_secs: 10,
            max_connections: 1024,
        }
    }
}

impl ApiServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Overlays `NLP_SERVER_*` environment variables onto the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("NLP_SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|_| anyhow!("NLP_SERVER_PORT must be a valid port number"))?;
        }
        if let Ok(host) = env::var("NLP_SERVER_HOST") {
            config.host = host;
        }
        if let Ok(timeout) = env::var("NLP_SERVER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .parse()
                .map_err(|_| anyhow!("NLP_SERVER_REQUEST_TIMEOUT_SECS must be a non-negative integer"))?;
        }
        if let Ok(max_conn) = env::var("NLP_SERVER_MAX_CONNECTIONS") {
            config.max_connections = max_conn
                .parse()
                .map_err(|_| anyhow!("NLP_SERVER_MAX_CONNECTIONS must be a non-negative integer"))?;
        }

        config.validate().map_err(|e| anyhow!("invalid server configuration: {e}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ApiServerConfig::default().validate().is_ok());
    }

    #[test]
    fn bind_address_formats_host_and_port() {
        let config = ApiServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
