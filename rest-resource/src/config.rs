//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `REST_`, nested keys separated by `__`,
//!    e.g. `REST_API__DEFAULT_LIMIT=50`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/rest-resource/{service_name}/config.toml
//! 4. System directory: /etc/rest-resource/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::registry::DuplicatePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Resource API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Interface to listen on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Resource endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix of every resource route, i.e. `{base_path}/{version}/{resource}`
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Limit passed to handlers when the request has none, or a non-positive one
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Upper bound for client-supplied limits
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// What happens when two handlers claim the same resource name
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Maximum request body size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode: permissive, restrictive, disabled
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,

    /// Header carrying the request id
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Check the limit settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(config_error("api limits must be positive"));
        }
        if self.default_limit > self.max_limit {
            return Err(config_error(format!(
                "api.default_limit ({}) exceeds api.max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(config_error(format!(
                "api.base_path '{}' must start with '/'",
                self.base_path
            )));
        }
        Ok(())
    }

    /// Base path without a trailing slash
    pub fn normalized_base_path(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
            request_id_header: default_request_id_header(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `host:port` listen address
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_base_path() -> String {
    "/api".to_string()
}

fn default_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    100
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config(Box::new(figment::Error::from(message.into())))
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name used for the XDG and system paths is taken from the
    /// binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "rest-resource".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("REST_").split("__"));

        let config: Config = figment.extract()?;
        config.api.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories. Environment variables still
    /// take precedence over the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("REST_").split("__"))
            .extract()?;

        config.api.validate()?;
        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("rest-resource");
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/rest-resource")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "rest-resource".to_string(),
                host: default_host(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            api: ApiConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.api.base_path, "/api");
        assert_eq!(config.api.default_limit, 20);
        assert_eq!(config.api.max_limit, 100);
        assert_eq!(config.api.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.api.validate().is_ok());
    }

    #[test]
    fn test_listen_address() {
        let config = Config::default();
        assert_eq!(config.service.listen_address(), "0.0.0.0:8080");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let api = ApiConfig {
            default_limit: 200,
            ..ApiConfig::default()
        };
        assert!(matches!(api.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let api = ApiConfig {
            default_limit: 0,
            ..ApiConfig::default()
        };
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_base_path() {
        let api = ApiConfig {
            base_path: "api".to_string(),
            ..ApiConfig::default()
        };
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_normalized_base_path() {
        let api = ApiConfig {
            base_path: "/api/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.normalized_base_path(), "/api");
    }

    #[test]
    fn test_load_from_file() {
        // Jail serializes access to the process environment
        Jail::expect_with(|_jail| {
            let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
            let path = dir.path().join("config.toml");
            std::fs::write(
                &path,
                r#"
[service]
name = "widgets"
port = 9090

[api]
default_limit = 5
duplicate_policy = "overwrite"
"#,
            )
            .map_err(|e| e.to_string())?;

            let config = Config::load_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(config.service.name, "widgets");
            assert_eq!(config.service.port, 9090);
            assert_eq!(config.api.default_limit, 5);
            assert_eq!(config.api.max_limit, 100);
            assert_eq!(config.api.duplicate_policy, DuplicatePolicy::Overwrite);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[service]
name = "widgets"

[api]
default_limit = 5
"#,
            )?;
            jail.set_env("REST_API__DEFAULT_LIMIT", "50");
            jail.set_env("REST_SERVICE__PORT", "7070");

            let config = Config::load_from("config.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.api.default_limit, 50);
            assert_eq!(config.service.port, 7070);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_values_are_config_errors() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[api]\ndefault_limit = 500\n")?;
            let result = Config::load_from("config.toml");
            assert!(matches!(result, Err(Error::Config(_))));
            Ok(())
        });
    }
}
