use crate::error::{ConfigError, Result};
use crate::settings::CareDeskConfig;

const MAX_HORIZON_DAYS: u32 = 366;

/// Reject configurations the workflow cannot run with.
pub fn validate(config: &CareDeskConfig) -> Result<()> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError("api.base_url must be set".to_string()));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be an http(s) URL, got {:?}",
            base_url
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError("api.timeout_secs must be positive".to_string()));
    }
    if config.schedule.upcoming_horizon_days == 0 || config.schedule.upcoming_horizon_days > MAX_HORIZON_DAYS {
        return Err(ConfigError::ValidationError(format!(
            "schedule.upcoming_horizon_days must be between 1 and {}",
            MAX_HORIZON_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&CareDeskConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = CareDeskConfig::default();
        config.api.base_url = "ftp://hms.local".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_zero_horizon_and_timeout() {
        let mut config = CareDeskConfig::default();
        config.schedule.upcoming_horizon_days = 0;
        assert!(validate(&config).is_err());

        let mut config = CareDeskConfig::default();
        config.api.timeout_secs = 0;
        assert!(validate(&config).is_err());
    }
}
