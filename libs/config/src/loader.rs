//! Configuration loader
//!
//! Builds a typed configuration from an optional TOML file with environment
//! variable overrides.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix for environment overrides of the scanner binary
pub const DEFAULT_ENV_PREFIX: &str = "SIGNALS";

/// Builder over the `config` crate sources
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    file: Option<PathBuf>,
    file_required: bool,
    list_keys: Vec<String>,
}

impl ConfigLoader {
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
            file: None,
            file_required: false,
            list_keys: Vec::new(),
        }
    }

    /// TOML file layered over the defaults; a missing file is skipped
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Fail when the configured file does not exist
    pub fn require_file(mut self, required: bool) -> Self {
        self.file_required = required;
        self
    }

    /// Dotted key whose environment value is split on commas
    pub fn list_key(mut self, key: impl Into<String>) -> Self {
        self.list_keys.push(key.into());
        self
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            let expanded = expand_path(path)?;
            if expanded.exists() {
                info!("Loading configuration file: {:?}", expanded);
            } else {
                debug!("Configuration file {:?} not found, using defaults", expanded);
            }
            builder = builder.add_source(
                File::from(expanded)
                    .format(FileFormat::Toml)
                    .required(self.file_required),
            );
        }

        let mut env = Environment::with_prefix(&self.env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        if !self.list_keys.is_empty() {
            env = env.list_separator(",");
            for key in &self.list_keys {
                env = env.with_list_parse_key(key);
            }
        }
        builder = builder.add_source(env);

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Convenience wrapper: optional file plus `prefix` environment overrides
pub fn load_config<T: DeserializeOwned>(path: Option<&Path>, env_prefix: &str) -> Result<T> {
    let mut loader = ConfigLoader::new(env_prefix);
    if let Some(path) = path {
        loader = loader.file(path);
    }
    loader.load()
}

/// Expand `~` and `$VAR` references in a configured path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path {:?}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct TestConfig {
        log_level: String,
        scan: ScanSection,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct ScanSection {
        interval_secs: u64,
        pairs: Vec<String>,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                log_level: "info".to_string(),
                scan: ScanSection::default(),
            }
        }
    }

    impl Default for ScanSection {
        fn default() -> Self {
            Self {
                interval_secs: 900,
                pairs: Vec::new(),
            }
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config: TestConfig =
            load_config(Some(&dir.path().join("absent.toml")), "SIGCFG_MISSING").unwrap();
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn test_load_file_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("signals.toml");

        let config_content = r#"
log_level = "debug"

[scan]
interval_secs = 60
pairs = ["btc_idr", "eth_idr"]
"#;
        fs::write(&config_path, config_content).unwrap();

        let config: TestConfig = load_config(Some(&config_path), "SIGCFG_FILE").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scan.interval_secs, 60);
        assert_eq!(config.scan.pairs, vec!["btc_idr", "eth_idr"]);
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("signals.toml");
        fs::write(&config_path, "[scan]\ninterval_secs = 60\n").unwrap();

        std::env::set_var("SIGCFG_ENV_SCAN__INTERVAL_SECS", "120");
        std::env::set_var("SIGCFG_ENV_SCAN__PAIRS", "btc_idr,doge_idr");

        let config: TestConfig = ConfigLoader::new("SIGCFG_ENV")
            .file(&config_path)
            .list_key("scan.pairs")
            .load()
            .unwrap();

        std::env::remove_var("SIGCFG_ENV_SCAN__INTERVAL_SECS");
        std::env::remove_var("SIGCFG_ENV_SCAN__PAIRS");

        assert_eq!(config.scan.interval_secs, 120);
        assert_eq!(config.scan.pairs, vec!["btc_idr", "doge_idr"]);
    }

    #[test]
    fn test_required_file_missing_fails() {
        let dir = tempdir().unwrap();
        let result: Result<TestConfig> = ConfigLoader::new("SIGCFG_REQ")
            .file(dir.path().join("absent.toml"))
            .require_file(true)
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_path_env_var() {
        std::env::set_var("SIGCFG_DATA_DIR", "/var/data");
        let expanded = expand_path(Path::new("$SIGCFG_DATA_DIR/audit.csv")).unwrap();
        assert_eq!(expanded, PathBuf::from("/var/data/audit.csv"));
    }
}
