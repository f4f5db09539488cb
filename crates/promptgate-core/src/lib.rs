//! Promptgate Core
//!
//! Core types, verdicts, and error handling shared across promptgate
//! components.
//!
//! This crate provides:
//! - The violation-category taxonomy and its criticality/PII lookups
//! - Layer result types for the pattern and classification passes
//! - The combined verdict and the caller-facing external summary
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    ClassifierVerdict, CombinedVerdict, ConfidenceLevel, ExternalSummary, PatternHit,
    PatternScan, Severity, SuggestedAction, VerdictOrigin, VerdictStatus, ViolationCategory,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        ClassifierVerdict, CombinedVerdict, ExternalSummary, PatternHit, PatternScan, Severity,
        VerdictStatus, ViolationCategory,
    };
}
