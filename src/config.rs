//! Configuration management for the directory service
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub graphql: GraphQLConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Origin used for absolute media URLs when the request carries no host
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Path prefix under which stored media is served
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// Directory (relative to the media prefix) holding image renditions
    #[serde(default = "default_thumbnail_dir")]
    pub thumbnail_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphQLConfig {
    #[serde(default = "default_depth_limit")]
    pub depth_limit: usize,

    #[serde(default = "default_complexity_limit")]
    pub complexity_limit: usize,

    /// Serve GraphiQL on GET /graphql
    #[serde(default = "default_playground")]
    pub playground: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_public_base_url() -> String { "http://localhost:8000".to_string() }
fn default_url_prefix() -> String { "/media/".to_string() }
fn default_thumbnail_dir() -> String { "thumbnails".to_string() }
fn default_depth_limit() -> usize { 16 }
fn default_complexity_limit() -> usize { 5000 }
fn default_playground() -> bool { true }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            url_prefix: default_url_prefix(),
            thumbnail_dir: default_thumbnail_dir(),
        }
    }
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            depth_limit: default_depth_limit(),
            complexity_limit: default_complexity_limit(),
            playground: default_playground(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), json_logging: false }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            media: MediaConfig::default(),
            graphql: GraphQLConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g. APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.media.url_prefix, "/media/");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.graphql.depth_limit, 16);
        assert!(!config.observability.json_logging);
    }
}
