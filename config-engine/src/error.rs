use error_common::{codes, ReportableError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing failed: {0}")]
    ParseError(#[from] Box<figment::Error>),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::ParseError(Box::new(error))
    }
}

impl ReportableError for ConfigError {
    fn code(&self) -> &'static str {
        codes::configuration::INVALID_CONFIGURATION
    }

    fn user_message(&self) -> String {
        format!("CareDesk is misconfigured: {}", self)
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
