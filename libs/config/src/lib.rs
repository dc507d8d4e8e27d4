//! # Signal Scanner Configuration
//!
//! Layered configuration loading shared by the adapter, notifier and
//! scanner crates.
//!
//! ## Layers
//!
//! 1. `Default` impl of the target struct (every section is `#[serde(default)]`)
//! 2. Optional TOML file
//! 3. Environment variables: `{PREFIX}_{SECTION}__{KEY}`, e.g.
//!    `SIGNALS_SCAN__INTERVAL_SECS=600`. Keys registered as list keys accept
//!    comma-separated values (`SIGNALS_SCAN__PAIRS=btc_idr,eth_idr`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use signal_config::ConfigLoader;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct AppConfig {
//!     log_level: String,
//! }
//!
//! let config: AppConfig = ConfigLoader::new("SIGNALS")
//!     .file("config/signals.toml")
//!     .load()
//!     .unwrap();
//! ```

pub mod loader;

pub use loader::{expand_path, load_config, ConfigLoader, DEFAULT_ENV_PREFIX};
