//! Core types shared by the promptgate evaluation pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A violation category recognized by the gateway.
///
/// The first five variants are PII categories and carry a typed redaction
/// placeholder. Criticality is a property of the category itself, so the
/// block-precedence rule in the decision combiner is a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationCategory {
    /// National identity number
    NationalId,
    /// International bank account number
    Iban,
    /// Phone number
    Phone,
    /// Email address
    Email,
    /// Passport number
    Passport,
    /// Insults, profanity, degrading language
    Toxicity,
    /// Threats of violence and extremist speech
    ViolentThreat,
    /// Derogatory statements about religious belief
    ReligiousInsult,
    /// Fabricated religious quotes or attributions
    ReligiousFabrication,
    /// Attempts to manipulate downstream model behavior
    PromptInjection,
    /// Attempts to extract internal or bulk data
    DataExfiltration,
    /// Fabricated official or electoral claims
    PoliticalDisinformation,
    /// Script, shell, or query injection payloads
    CodeInjection,
}

impl ViolationCategory {
    /// All categories, in declaration order
    pub const ALL: [ViolationCategory; 13] = [
        Self::NationalId,
        Self::Iban,
        Self::Phone,
        Self::Email,
        Self::Passport,
        Self::Toxicity,
        Self::ViolentThreat,
        Self::ReligiousInsult,
        Self::ReligiousFabrication,
        Self::PromptInjection,
        Self::DataExfiltration,
        Self::PoliticalDisinformation,
        Self::CodeInjection,
    ];

    /// Whether this category is personally identifiable information
    pub fn is_pii(&self) -> bool {
        matches!(
            self,
            Self::NationalId | Self::Iban | Self::Phone | Self::Email | Self::Passport
        )
    }

    /// Whether the mere presence of this category forces a Block verdict
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::ViolentThreat
                | Self::ReligiousFabrication
                | Self::PromptInjection
                | Self::DataExfiltration
                | Self::PoliticalDisinformation
                | Self::CodeInjection
        )
    }

    /// Typed redaction placeholder for PII categories
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::NationalId => Some("[REDACTED-NATIONAL-ID]"),
            Self::Iban => Some("[REDACTED-IBAN]"),
            Self::Phone => Some("[REDACTED-PHONE]"),
            Self::Email => Some("[REDACTED-EMAIL]"),
            Self::Passport => Some("[REDACTED-PASSPORT]"),
            _ => None,
        }
    }

    /// Stable string identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalId => "national-id",
            Self::Iban => "iban",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Passport => "passport",
            Self::Toxicity => "toxicity",
            Self::ViolentThreat => "violent-threat",
            Self::ReligiousInsult => "religious-insult",
            Self::ReligiousFabrication => "religious-fabrication",
            Self::PromptInjection => "prompt-injection",
            Self::DataExfiltration => "data-exfiltration",
            Self::PoliticalDisinformation => "political-disinformation",
            Self::CodeInjection => "code-injection",
        }
    }

    /// Lenient parse used for untrusted classifier output.
    ///
    /// Accepts kebab-case, snake_case, and mixed case; returns None for
    /// anything outside the taxonomy.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == normalized)
    }
}

/// Severity reported by the classification layer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Lenient parse used for untrusted classifier output
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Action suggested by the classification layer (advisory only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Allow,
    Redact,
    Flag,
    Block,
}

impl SuggestedAction {
    /// Lenient parse used for untrusted classifier output
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "redact" => Some(Self::Redact),
            "flag" => Some(Self::Flag),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// Final status of a combined verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Allow,
    Redacted,
    Flag,
    Block,
}

impl VerdictStatus {
    /// Stable string identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Redacted => "REDACTED",
            Self::Flag => "FLAG",
            Self::Block => "BLOCK",
        }
    }
}

/// A single detector finding from the pattern layer.
///
/// Immutable once produced; spans are byte offsets into the scanned text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternHit {
    /// Category of the detector that matched
    pub category: ViolationCategory,

    /// Matched span bounds (start, end), non-overlapping within a category
    pub spans: Vec<(usize, usize)>,
}

/// Result of running the full detector catalog over one input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternScan {
    /// One hit per detector category that matched
    pub hits: Vec<PatternHit>,

    /// Deterministic confidence score (degrades with distinct categories)
    pub confidence: f32,

    /// Whether the input exceeded the bounded scan window
    pub truncated: bool,
}

impl PatternScan {
    /// A scan with no findings
    pub fn clean(confidence: f32) -> Self {
        Self {
            hits: Vec::new(),
            confidence,
            truncated: false,
        }
    }

    /// Distinct violating categories found by the pattern layer
    pub fn categories(&self) -> BTreeSet<ViolationCategory> {
        self.hits.iter().map(|hit| hit.category).collect()
    }

    /// PII hits only
    pub fn pii_hits(&self) -> Vec<&PatternHit> {
        self.hits.iter().filter(|hit| hit.category.is_pii()).collect()
    }

    /// Whether any detector matched
    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Where a classifier verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictOrigin {
    /// Parsed from a well-formed remote classification response
    Remote,
    /// Local pattern-only fallback after transport failure or timeout
    Fallback,
    /// Remote response could not be parsed; safe defaults applied
    Malformed,
    /// Classification was not invoked (empty-input fast path)
    Skipped,
}

/// Verdict from the external classification layer.
///
/// Untrusted, advisory input to the decision combiner: it can escalate a
/// verdict, but its absence or failure never suppresses pattern findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    /// Whether the classifier considers the content harmful
    pub is_harmful: bool,

    /// Violation categories reported by the classifier
    pub categories: BTreeSet<ViolationCategory>,

    /// Reported severity
    pub severity: Severity,

    /// Reported confidence, clamped to [0, 1]
    pub confidence: f32,

    /// Action the classifier suggests (advisory)
    pub suggested_action: SuggestedAction,

    /// Redacted copy of the content, if the classifier produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redacted_content: Option<String>,

    /// Provenance of this verdict
    pub origin: VerdictOrigin,
}

impl ClassifierVerdict {
    /// A benign remote verdict with the given confidence
    pub fn benign(confidence: f32) -> Self {
        Self {
            is_harmful: false,
            categories: BTreeSet::new(),
            severity: Severity::None,
            confidence,
            suggested_action: SuggestedAction::Allow,
            redacted_content: None,
            origin: VerdictOrigin::Remote,
        }
    }
}

/// The single verdict produced by the decision combiner.
///
/// Created once per evaluation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedVerdict {
    /// Final status
    pub status: VerdictStatus,

    /// Deduplicated union of violations from both layers
    pub violations: BTreeSet<ViolationCategory>,

    /// Maximum of the two layer confidences
    pub confidence: f32,

    /// Internal, detailed reason; never crosses the trust boundary
    pub reason: String,
}

/// Coarse confidence bucket exposed to external callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Caller-facing summary of an evaluation.
///
/// Derived fresh from a [`CombinedVerdict`] on every call and never
/// persisted. Must not contain raw violation identifiers, matched text, or
/// any detail of the detection layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSummary {
    /// Whether the content may be forwarded
    pub permitted: bool,

    /// Whether the content passed without any policy concern
    pub policy_compliant: bool,

    /// Whether the returned content differs from the submission
    pub modifications_applied: bool,

    /// Coarse policy areas under which modifications were applied
    pub modifications: Vec<String>,

    /// Coarse confidence bucket
    pub confidence_level: ConfidenceLevel,

    /// Human-readable explanation, category-level only
    pub summary: String,
}
