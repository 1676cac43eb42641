//! Configuration management for CareDesk
//!
//! Configuration is assembled from layered sources, later ones winning:
//!
//! 1. Built-in defaults ([`CareDeskConfig::default`])
//! 2. An optional YAML or TOML file
//! 3. Environment variables prefixed with `CAREDESK_`, nested with `__`
//!
//! The result is validated before it is handed out.
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::ConfigEngine;
//!
//! let config = ConfigEngine::new().with_file("caredesk.yaml").load()?;
//! println!("talking to {}", config.api.base_url);
//! # Ok::<(), config_engine::ConfigError>(())
//! ```
//!
//! ```yaml
//! api:
//!   base_url: "https://hms.example.org/api"
//!   timeout_secs: 30
//! schedule:
//!   upcoming_horizon_days: 7
//! logging:
//!   level: "info"
//! ```

pub mod engine;
pub mod error;
pub mod settings;
pub mod validation;

pub use engine::*;
pub use error::*;
pub use settings::*;
pub use validation::validate;
