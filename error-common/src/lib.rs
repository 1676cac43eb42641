//! Common error handling utilities for CareDesk
//!
//! Every crate in the workspace keeps its own `thiserror` enum. This crate
//! provides the pieces they share when an error has to leave the core and be
//! shown to a person:
//!
//! - **Error Codes**: stable, documented codes for every failure class
//! - **Context Preservation**: identifiers attached to an error without PII
//! - **Error Reports**: the serialisable payload behind a failure banner
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ErrorContext, ErrorReporter, ReportableError};
//!
//! #[derive(Debug)]
//! struct TooLate;
//!
//! impl std::fmt::Display for TooLate {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("appointment already closed")
//!     }
//! }
//!
//! impl ReportableError for TooLate {
//!     fn code(&self) -> &'static str {
//!         codes::workflow::INVALID_TRANSITION
//!     }
//!
//!     fn user_message(&self) -> String {
//!         "This appointment can no longer be changed.".to_string()
//!     }
//! }
//!
//! let report = ErrorReporter::new().report(
//!     &TooLate,
//!     ErrorContext::new().add_context("appointment_id", "apt-1"),
//! );
//! assert_eq!(report.code, "WORKFLOW_5001");
//! assert!(report.recoverable);
//! ```

pub mod codes;
pub mod context;
pub mod reporting;
pub mod types;

pub use context::*;
pub use reporting::*;
pub use types::*;
