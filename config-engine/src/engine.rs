use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use tracing::debug;

use crate::error::Result;
use crate::settings::CareDeskConfig;
use crate::validation::validate;

/// Prefix of environment overrides, e.g. `CAREDESK_API__BASE_URL`
pub const ENV_PREFIX: &str = "CAREDESK_";

/// Layered loader: defaults, then an optional file, then the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigEngine {
    file: Option<PathBuf>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a YAML or TOML file, picked by extension. A missing file is skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(CareDeskConfig::default()));

        if let Some(path) = &self.file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                _ => figment.merge(Yaml::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(&self) -> Result<CareDeskConfig> {
        let config: CareDeskConfig = self.figment().extract()?;
        validate(&config)?;

        debug!(
            base_url = %config.api.base_url,
            upcoming_horizon_days = config.schedule.upcoming_horizon_days,
            "Configuration loaded"
        );
        Ok(config)
    }
}
