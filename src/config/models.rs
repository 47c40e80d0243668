// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub frontend: FrontendConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Exported classifier artifact (`.json`, `.yaml` or `.yml`).
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/diabetes_model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub enabled: bool,
    pub build_dir: PathBuf,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            build_dir: PathBuf::from("frontend/build"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl CorsConfig {
    /// A `*` entry anywhere in the list opens every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("server port must not be 0")]
    ZeroPort,

    #[error("metrics port {0} collides with the server port")]
    PortCollision(u16),

    #[error("metrics path must start with '/' (got {0:?})")]
    MetricsPath(String),

    #[error("server.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("model.path must not be empty")]
    EmptyModelPath,

    #[error("cors.allowed_origins must list at least one origin")]
    NoCorsOrigins,

    #[error("invalid override {key}: {reason}")]
    Override { key: String, reason: String },
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        if self.model.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        if self.cors.allowed_origins.is_empty() {
            return Err(ConfigError::NoCorsOrigins);
        }
        if self.metrics.enabled {
            if self.metrics.port == self.server.port {
                return Err(ConfigError::PortCollision(self.metrics.port));
            }
            if !self.metrics.path.starts_with('/') {
                return Err(ConfigError::MetricsPath(self.metrics.path.clone()));
            }
        }
        Ok(())
    }

    /// Apply `section.key` overrides, as produced by the `DIABETES_` environment source.
    pub fn apply_overrides(
        &mut self,
        overrides: ::config::Map<String, ::config::Value>,
    ) -> Result<(), ConfigError> {
        for (key, value) in overrides {
            let invalid = |reason: String| ConfigError::Override {
                key: key.clone(),
                reason,
            };
            match key.as_str() {
                "server.host" => {
                    let raw = value.into_string().map_err(|e| invalid(e.to_string()))?;
                    self.server.host = raw.parse().map_err(|e| invalid(format!("{e}")))?;
                }
                "server.port" => self.server.port = int_override(value).map_err(invalid)?,
                "server.max_body_bytes" => {
                    self.server.max_body_bytes = int_override(value).map_err(invalid)?
                }
                "model.path" => {
                    let raw = value.into_string().map_err(|e| invalid(e.to_string()))?;
                    self.model.path = PathBuf::from(raw);
                }
                "frontend.enabled" => {
                    self.frontend.enabled = value.into_bool().map_err(|e| invalid(e.to_string()))?
                }
                "frontend.build_dir" => {
                    let raw = value.into_string().map_err(|e| invalid(e.to_string()))?;
                    self.frontend.build_dir = PathBuf::from(raw);
                }
                "cors.allowed_origins" => {
                    let raw = value.into_string().map_err(|e| invalid(e.to_string()))?;
                    self.cors.allowed_origins = raw
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "metrics.enabled" => {
                    self.metrics.enabled = value.into_bool().map_err(|e| invalid(e.to_string()))?
                }
                "metrics.port" => self.metrics.port = int_override(value).map_err(invalid)?,
                "metrics.path" => {
                    self.metrics.path = value.into_string().map_err(|e| invalid(e.to_string()))?
                }
                _ => tracing::warn!("Ignoring unknown configuration override: {}", key),
            }
        }
        Ok(())
    }
}

fn int_override<T: TryFrom<i64>>(value: ::config::Value) -> Result<T, String> {
    let raw = value.into_int().map_err(|e| e.to_string())?;
    T::try_from(raw).map_err(|_| format!("{raw} is out of range"))
}
