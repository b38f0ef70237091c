//! Server configuration module
//! Handles dynamic configuration parameters for the room server

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_ROUND_LEAD_MS, MAX_ROUND_LEAD_MS};
use crate::error::{Result, UnchiError};
use std::env;
use std::path::Path;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Delay between accepting `start_round` and the round's time zero
    pub round_lead_ms: i64,
    /// TLS configuration
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    /// Enable TLS
    pub enable_tls: bool,
}

impl ServerConfig {
    /// Loopback configuration for tests, port 0 lets the OS choose
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            round_lead_ms: DEFAULT_ROUND_LEAD_MS,
            tls_cert_path: None,
            tls_key_path: None,
            enable_tls: false,
        }
    }

    fn parse_flag(value: &str) -> bool {
        value.to_lowercase() == "true" || value == "1"
    }

    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("UNCHI_HOST").unwrap_or(DEFAULT_HOST.to_string());

        let port = match env::var("UNCHI_PORT").or_else(|_| env::var("PORT")) {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                UnchiError::ConfigError(format!("Invalid port '{}'", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let round_lead_ms = match env::var("UNCHI_ROUND_LEAD_MS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                UnchiError::ConfigError(format!("Invalid UNCHI_ROUND_LEAD_MS '{}'", raw))
            })?,
            Err(_) => DEFAULT_ROUND_LEAD_MS,
        };

        if round_lead_ms <= 0 || round_lead_ms > MAX_ROUND_LEAD_MS {
            return Err(UnchiError::ConfigError(format!(
                "UNCHI_ROUND_LEAD_MS must be between 1 and {} (got {})",
                MAX_ROUND_LEAD_MS, round_lead_ms
            )));
        }

        // TLS configuration
        let enable_tls = env::var("UNCHI_ENABLE_TLS")
            .map(|v| Self::parse_flag(&v))
            .unwrap_or(false);

        let tls_cert_path = env::var("UNCHI_TLS_CERT_PATH").ok();
        let tls_key_path = env::var("UNCHI_TLS_KEY_PATH").ok();

        if enable_tls {
            match (&tls_cert_path, &tls_key_path) {
                (Some(cert_path), Some(key_path)) => {
                    if !Path::new(cert_path).exists() {
                        return Err(UnchiError::ConfigError(format!(
                            "TLS certificate file does not exist: {}",
                            cert_path
                        )));
                    }
                    if !Path::new(key_path).exists() {
                        return Err(UnchiError::ConfigError(format!(
                            "TLS private key file does not exist: {}",
                            key_path
                        )));
                    }
                }
                _ => {
                    return Err(UnchiError::ConfigError(
                        "TLS is enabled but UNCHI_TLS_CERT_PATH or UNCHI_TLS_KEY_PATH is not set"
                            .to_string(),
                    ))
                }
            }
        }

        Ok(Self {
            host,
            port,
            round_lead_ms,
            enable_tls,
            tls_cert_path,
            tls_key_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-mutating cases share one test so they cannot race each other.
    #[test]
    fn test_from_env() {
        for key in [
            "UNCHI_HOST",
            "UNCHI_PORT",
            "PORT",
            "UNCHI_ROUND_LEAD_MS",
            "UNCHI_ENABLE_TLS",
            "UNCHI_TLS_CERT_PATH",
            "UNCHI_TLS_KEY_PATH",
        ] {
            env::remove_var(key);
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.round_lead_ms, DEFAULT_ROUND_LEAD_MS);
        assert!(!config.enable_tls);

        env::set_var("PORT", "9001");
        assert_eq!(ServerConfig::from_env().unwrap().port, 9001);
        env::set_var("UNCHI_PORT", "9002");
        assert_eq!(ServerConfig::from_env().unwrap().port, 9002);
        env::set_var("UNCHI_PORT", "not-a-port");
        assert!(ServerConfig::from_env().is_err());
        env::remove_var("UNCHI_PORT");
        env::remove_var("PORT");

        env::set_var("UNCHI_ROUND_LEAD_MS", "0");
        assert!(ServerConfig::from_env().is_err());
        env::set_var("UNCHI_ROUND_LEAD_MS", "abc");
        match ServerConfig::from_env() {
            Err(UnchiError::ConfigError(msg)) => assert!(msg.contains("abc")),
            other => panic!("expected config error, got {:?}", other),
        }
        env::set_var("UNCHI_ROUND_LEAD_MS", "2500");
        assert_eq!(ServerConfig::from_env().unwrap().round_lead_ms, 2500);
        env::remove_var("UNCHI_ROUND_LEAD_MS");

        env::set_var("UNCHI_ENABLE_TLS", "true");
        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("UNCHI_TLS_CERT_PATH"));
        env::remove_var("UNCHI_ENABLE_TLS");
    }

    #[test]
    fn test_for_testing_uses_ephemeral_port() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert_eq!(config.host, "127.0.0.1");
    }
}
