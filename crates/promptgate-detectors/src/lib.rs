//! Promptgate Detectors
//!
//! Deterministic pattern layer for the promptgate gateway.
//!
//! This crate provides:
//! - A declarative detector catalog: regex shapes for PII, case-insensitive
//!   Aho-Corasick phrase sets for everything else
//! - The pattern matcher with its degrading confidence score and bounded
//!   scan window
//! - The idempotent, category-typed PII redactor
//!
//! Everything here is pure and CPU-cheap; the expensive classification pass
//! lives in `promptgate-classifier`.

pub mod catalog;
pub mod matcher;
pub mod redactor;

pub use catalog::{DetectorEntry, DetectorMatcher, PatternCatalog, PII_SHAPES};
pub use matcher::{
    confidence_for, PatternMatcher, BASE_CONFIDENCE, CATEGORY_PENALTY, CONFIDENCE_FLOOR,
    DEFAULT_SCAN_WINDOW,
};
pub use redactor::{Redaction, Redactor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::PatternCatalog;
    pub use crate::matcher::PatternMatcher;
    pub use crate::redactor::{Redaction, Redactor};
}
