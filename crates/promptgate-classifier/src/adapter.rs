//! Classifier adapter
//!
//! Sends the fixed category taxonomy plus the raw input to the external
//! classification capability, validates the structured response field by
//! field, and degrades instead of failing:
//! - transport failure or timeout -> local pattern-only fallback verdict
//!   with a lowered confidence ceiling
//! - malformed response -> safe defaults, suggested action Flag, never Allow
//!
//! One attempt per evaluation; retry-with-backoff would be a compatible
//! extension but is deliberately not implemented.

use crate::client::CompletionClient;
use promptgate_core::{
    ClassifierVerdict, Severity, SuggestedAction, VerdictOrigin, ViolationCategory,
};
use promptgate_detectors::PatternMatcher;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Confidence ceiling applied to pattern-only fallback verdicts
pub const FALLBACK_CONFIDENCE_CEILING: f32 = 0.60;

/// Default bound on the classification call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Confidence assumed when the classifier omits the field
const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Adapter around the external classification capability.
///
/// `classify` is infallible by design: every failure mode resolves to a
/// usable verdict so the classifier can never make the gateway unavailable.
pub struct ClassifierAdapter {
    client: Arc<dyn CompletionClient>,
    matcher: Arc<PatternMatcher>,
    timeout: Duration,
}

impl ClassifierAdapter {
    /// Create an adapter over a completion client and the local matcher
    pub fn new(client: Arc<dyn CompletionClient>, matcher: Arc<PatternMatcher>) -> Self {
        Self {
            client,
            matcher,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the classification call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify the given text, always producing a verdict
    pub async fn classify(&self, text: &str) -> ClassifierVerdict {
        let prompt = build_instruction(text);

        match tokio::time::timeout(self.timeout, self.client.generate(&prompt)).await {
            Ok(Ok(raw)) => self.parse_response(&raw),
            Ok(Err(e)) => {
                warn!(error = %e, "classification call failed, using pattern-only fallback");
                self.fallback(text)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "classification call timed out, using pattern-only fallback"
                );
                self.fallback(text)
            }
        }
    }

    /// Parse and validate a remote response
    fn parse_response(&self, raw: &str) -> ClassifierVerdict {
        let Some(json) = extract_json(raw) else {
            warn!("classification response contained no JSON object");
            return malformed_verdict();
        };

        match serde_json::from_str::<RawVerdict>(json) {
            Ok(parsed) => validate(parsed),
            Err(e) => {
                warn!(error = %e, "classification response failed schema parse");
                malformed_verdict()
            }
        }
    }

    /// Reduced local-only analysis substituted when the remote call fails
    fn fallback(&self, text: &str) -> ClassifierVerdict {
        let scan = self.matcher.scan(text);
        let categories = scan.categories();

        let has_critical = categories.iter().any(|c| c.is_critical());
        let only_pii = !categories.is_empty() && categories.iter().all(|c| c.is_pii());

        let severity = if has_critical {
            Severity::High
        } else if only_pii {
            Severity::Low
        } else if !categories.is_empty() {
            Severity::Medium
        } else {
            Severity::None
        };

        let suggested_action = if has_critical {
            SuggestedAction::Block
        } else if only_pii {
            SuggestedAction::Redact
        } else if !categories.is_empty() {
            SuggestedAction::Flag
        } else {
            SuggestedAction::Allow
        };

        debug!(
            categories = categories.len(),
            "fallback verdict from local patterns"
        );

        ClassifierVerdict {
            is_harmful: !categories.is_empty(),
            severity,
            confidence: scan.confidence.min(FALLBACK_CONFIDENCE_CEILING),
            suggested_action,
            redacted_content: None,
            origin: VerdictOrigin::Fallback,
            categories,
        }
    }
}

/// Fixed classification instruction carrying the full taxonomy
fn build_instruction(text: &str) -> String {
    let mut taxonomy = String::new();
    for category in ViolationCategory::ALL {
        taxonomy.push_str("- ");
        taxonomy.push_str(category.as_str());
        taxonomy.push('\n');
    }

    format!(
        "You are a content-safety classifier. Evaluate the user content below \
         against these violation categories:\n{taxonomy}\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"is_harmful\": bool, \"violation_categories\": [string], \
         \"severity\": \"none|low|medium|high|critical\", \
         \"confidence\": number, \
         \"suggested_action\": \"allow|redact|flag|block\", \
         \"redacted_content\": string|null}}\n\n\
         User content:\n{text}"
    )
}

/// Raw response shape: every field optional, nothing trusted
#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_harmful: Option<bool>,
    #[serde(alias = "violations")]
    violation_categories: Option<Vec<String>>,
    severity: Option<String>,
    confidence: Option<f32>,
    suggested_action: Option<String>,
    redacted_content: Option<String>,
}

/// Apply documented per-field defaults to an untrusted response.
///
/// The invariant: a malformed or partial response may escalate but never
/// silently downgrades to Allow when any field suggests harm.
fn validate(raw: RawVerdict) -> ClassifierVerdict {
    let mut categories = BTreeSet::new();
    for value in raw.violation_categories.unwrap_or_default() {
        match ViolationCategory::parse(&value) {
            Some(category) => {
                categories.insert(category);
            }
            None => warn!(category = %value, "dropping unknown classifier category"),
        }
    }

    let is_harmful = raw.is_harmful.unwrap_or(!categories.is_empty());

    let severity = match raw.severity.as_deref().map(Severity::parse) {
        Some(Some(severity)) => severity,
        // Missing or out-of-taxonomy severity on harmful content defaults
        // to Medium, which the combiner maps to Flag.
        Some(None) | None if is_harmful => Severity::Medium,
        _ => Severity::None,
    };

    let confidence = raw
        .confidence
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let suggested_action = match raw.suggested_action.as_deref().map(SuggestedAction::parse) {
        Some(Some(action)) => action,
        _ if is_harmful || !categories.is_empty() => SuggestedAction::Flag,
        _ => SuggestedAction::Allow,
    };

    ClassifierVerdict {
        is_harmful,
        categories,
        severity,
        confidence,
        suggested_action,
        redacted_content: raw.redacted_content,
        origin: VerdictOrigin::Remote,
    }
}

/// Verdict for a response that could not be parsed at all
fn malformed_verdict() -> ClassifierVerdict {
    ClassifierVerdict {
        is_harmful: false,
        categories: BTreeSet::new(),
        severity: Severity::Low,
        confidence: 0.0,
        suggested_action: SuggestedAction::Flag,
        redacted_content: None,
        origin: VerdictOrigin::Malformed,
    }
}

/// Locate the outermost JSON object in a possibly chatty completion
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
