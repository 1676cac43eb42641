use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::config::LoggerConfig;
use crate::error::LoggerError;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+1[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b").expect("phone pattern");
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern");
    static ref CREDIT_CARD_REGEX: Regex =
        Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").expect("card pattern");
    static ref IP_REGEX: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("ip pattern");
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_credit_cards: bool,
    pub redact_ip_addresses: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_credit_cards: true,
            redact_ip_addresses: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// Build from the serialisable logger settings, compiling custom patterns.
    pub fn from_logger_config(config: &LoggerConfig) -> Result<Self, LoggerError> {
        let custom_patterns = config
            .custom_patterns
            .iter()
            .map(|custom| {
                Regex::new(&custom.pattern)
                    .map(|regex| (regex, custom.replacement.clone()))
                    .map_err(|e| LoggerError::InvalidPattern {
                        pattern: custom.pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hash_for_correlation: config.hash_for_correlation,
            custom_patterns,
            ..Self::default()
        })
    }
}

/// PII redactor for log lines
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // Cards before phones: a card number contains phone-shaped runs.
        if self.config.redact_credit_cards {
            result = self.replace(&CREDIT_CARD_REGEX, &result, "CC", |_| "****-****-****-****".to_string());
        }

        if self.config.redact_ssn {
            result = self.replace(&SSN_REGEX, &result, "SSN", |_| "***-**-****".to_string());
        }

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", mask_email);
        }

        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", |_| "(***) ***-****".to_string());
        }

        if self.config.redact_ip_addresses {
            result = self.replace(&IP_REGEX, &result, "IP", mask_ip);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }

    fn replace(&self, regex: &Regex, text: &str, label: &str, mask: impl Fn(&str) -> String) -> String {
        regex
            .replace_all(text, |caps: &Captures| {
                let value = &caps[0];
                if self.config.hash_for_correlation {
                    format!("{}[{}]", label, hash_value(value))
                } else {
                    mask(value)
                }
            })
            .into_owned()
    }
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let local_head: String = local.chars().take(1).collect();
            let domain_head: String = domain.chars().take(1).collect();
            format!("{}***@{}***", local_head, domain_head)
        }
        None => "***@***".to_string(),
    }
}

fn mask_ip(ip: &str) -> String {
    let parts: Vec<&str> = ip.split('.').collect();
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) if parts.len() == 4 => format!("{}.***.***.{}", first, last),
        _ => "***.***.***.***".to_string(),
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // 8 bytes are enough to correlate lines.
    general_purpose::STANDARD_NO_PAD.encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomPattern;

    fn masking_redactor() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig::default())
    }

    #[test]
    fn test_email_redaction() {
        let redacted = masking_redactor().redact("Patient jane.roe@example.com booked a visit");
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("jane.roe"));
    }

    #[test]
    fn test_phone_redaction() {
        let redacted = masking_redactor().redact("Call back on (555) 123-4567 tomorrow");
        assert!(redacted.contains("(***) ***-****"));
        assert!(!redacted.contains("123-4567"));
    }

    #[test]
    fn test_card_is_not_mistaken_for_phone() {
        let redacted = masking_redactor().redact("card 4111-1111-1111-1111 on file");
        assert_eq!(redacted, "card ****-****-****-**** on file");
    }

    #[test]
    fn test_identifiers_pass_through() {
        let line = "appointment_id=apt-42 status=completed";
        assert_eq!(masking_redactor().redact(line), line);
    }

    #[test]
    fn test_hash_for_correlation_is_stable() {
        let redactor = PiiRedactor::new(RedactionConfig {
            hash_for_correlation: true,
            ..Default::default()
        });

        let first = redactor.redact("contact a.b@clinic.org");
        let second = redactor.redact("contact a.b@clinic.org");
        assert_eq!(first, second);
        assert!(first.starts_with("contact EMAIL["));
        assert!(!first.contains("clinic.org"));
    }

    #[test]
    fn test_custom_pattern_from_logger_config() {
        let config = LoggerConfig {
            custom_patterns: vec![CustomPattern {
                pattern: r"\bMRN\d+".to_string(),
                replacement: "MRN[REDACTED]".to_string(),
            }],
            ..LoggerConfig::default()
        };
        let redactor = PiiRedactor::new(RedactionConfig::from_logger_config(&config).unwrap());

        assert_eq!(redactor.redact("chart MRN123456 opened"), "chart MRN[REDACTED] opened");
    }

    #[test]
    fn test_invalid_custom_pattern_is_rejected() {
        let config = LoggerConfig {
            custom_patterns: vec![CustomPattern {
                pattern: "(unclosed".to_string(),
                replacement: String::new(),
            }],
            ..LoggerConfig::default()
        };

        let err = RedactionConfig::from_logger_config(&config).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidPattern { .. }));
    }
}
