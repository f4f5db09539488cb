//! Promptgate Classifier
//!
//! Adapter around the external AI classification capability.
//!
//! This crate provides:
//! - The `CompletionClient` trait: providers reduced to a single
//!   `generate(prompt) -> text` capability, plus a minimal HTTP
//!   implementation
//! - The `ClassifierAdapter`: fixed taxonomy instruction, bounded single
//!   attempt, field-by-field schema validation with safe defaults, and a
//!   pattern-only fallback verdict when the remote call cannot complete
//!
//! The adapter never errors and never blocks an evaluation: classification
//! is advisory, and its failure degrades confidence rather than
//! availability.

pub mod adapter;
pub mod client;

pub use adapter::{ClassifierAdapter, DEFAULT_TIMEOUT, FALLBACK_CONFIDENCE_CEILING};
pub use client::{CompletionClient, HttpCompletionClient};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::ClassifierAdapter;
    pub use crate::client::{CompletionClient, HttpCompletionClient};
}
