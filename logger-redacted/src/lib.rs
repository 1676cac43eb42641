//! HIPAA-compliant logging with automatic PII redaction
//!
//! Wires `tracing-subscriber` so that every formatted line passes through a
//! [`PiiRedactor`] before it is written. Structured fields should carry
//! identifiers only; the redactor is the safety net for free text that slips
//! a patient's email or phone number into a message.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: user@example.com → u***@e***
//! - **Phone Numbers**: (555) 123-4567 → (***) ***-****
//! - **SSN**: 123-45-6789 → ***-**-****
//! - **Credit Cards**: 4111-1111-1111-1111 → ****-****-****-****
//! - **IP Addresses**: 192.168.1.1 → 192.***.***.1
//! - **Custom Patterns**: configurable regex replacements
//!
//! With `hash_for_correlation` the mask is replaced by a short SHA-256 tag
//! (`EMAIL[...]`) so repeated occurrences can still be correlated.
//!
//! # Configuration
//!
//! ```yaml
//! logging:
//!   level: "info,workflow_engine=debug"
//!   json: true
//!   redaction_enabled: true
//!   hash_for_correlation: false
//!   custom_patterns:
//!     - pattern: "\\bMRN\\d+"
//!       replacement: "MRN[REDACTED]"
//! ```

pub mod config;
pub mod error;
pub mod redactor;
pub mod writer;

pub use config::*;
pub use error::*;
pub use redactor::*;
pub use writer::*;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when set.
pub fn init(config: &LoggerConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggerError::InvalidFilter {
            directive: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let writer = if config.redaction_enabled {
        let redactor = PiiRedactor::new(RedactionConfig::from_logger_config(config)?);
        RedactingMakeWriter::new(std::io::stdout, redactor)
    } else {
        RedactingMakeWriter::passthrough(std::io::stdout)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| LoggerError::InitFailed(e.to_string()))?;

    tracing::debug!(
        json = config.json,
        redaction_enabled = config.redaction_enabled,
        "Logger initialised"
    );
    Ok(())
}
