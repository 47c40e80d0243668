// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use ::config::Source;
use std::path::Path;

/// Environment prefix for overrides, e.g. `DIABETES_SERVER__PORT=8081`.
pub const ENV_PREFIX: &str = "DIABETES";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let mut config = parse_config(path, &contents)?;
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Built-in defaults plus environment overrides, for runs without a config file.
pub fn default_config() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let config: Config = if path.extension().and_then(|s| s.to_str()) == Some("yaml")
        || path.extension().and_then(|s| s.to_str()) == Some("yml") {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    let overrides = ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .collect()
        .context("Failed to read environment overrides")?;
    config.apply_overrides(overrides)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = r#"
server:
  port: 8123
model:
  path: /opt/models/diabetes.yaml
"#;
        let config = parse_config(Path::new("config.yaml"), yaml).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert_eq!(config.model.path, PathBuf::from("/opt/models/diabetes.yaml"));
        assert!(config.metrics.enabled);
    }

    #[test]
    fn parses_json_by_default() {
        let json = r#"{"frontend": {"enabled": false}, "metrics": {"port": 9191}}"#;
        let config = parse_config(Path::new("config.json"), json).unwrap();
        assert!(!config.frontend.enabled);
        assert_eq!(config.metrics.port, 9191);
    }

    #[test]
    fn server_port_on_the_metrics_port_fails_validation() {
        let config = parse_config(Path::new("config.yml"), "server:\n  port: 9090\n").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::PortCollision(9090)));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path().join("absent.yaml")).await.is_err());
    }
}
