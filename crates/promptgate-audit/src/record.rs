//! Audit records
//!
//! One immutable record per evaluation. Records never contain the raw
//! submitted text: correlation happens through a one-way fingerprint plus a
//! bounded preview that is sufficient for debugging without turning the
//! audit trail into a PII store of record.

use chrono::{DateTime, Utc};
use promptgate_core::{Severity, VerdictOrigin, VerdictStatus, ViolationCategory};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest
const FINGERPRINT_LEN: usize = 16;

/// One-way content fingerprint; not reversible to the original text
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// Generate a unique audit id
pub fn generate_audit_id() -> String {
    format!("aud_{}", uuid::Uuid::new_v4())
}

/// Pattern-layer result as recorded for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternLayerRecord {
    /// Distinct categories the pattern layer reported
    pub categories: Vec<ViolationCategory>,

    /// Pattern-layer confidence
    pub confidence: f32,

    /// Whether the scan window truncated the input
    pub truncated: bool,
}

/// Classifier-layer result as recorded for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierLayerRecord {
    /// Provenance of the verdict (remote, fallback, malformed)
    pub origin: VerdictOrigin,

    /// Whether the classifier reported harm
    pub is_harmful: bool,

    /// Reported severity
    pub severity: Severity,

    /// Categories the classifier reported
    pub categories: Vec<ViolationCategory>,

    /// Classifier confidence
    pub confidence: f32,
}

/// A single immutable audit record.
///
/// Once appended to a sink, a record is never updated or deleted by this
/// subsystem. The `prev_hash`/`hash` pair chains records within one day
/// file for tamper evidence; both are filled in by the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique id for this evaluation
    pub audit_id: String,

    /// When the evaluation completed
    pub timestamp: DateTime<Utc>,

    /// One-way fingerprint of the submitted text
    pub fingerprint: String,

    /// Bounded preview of the submitted text
    pub preview: String,

    /// Pattern-layer result
    pub pattern_layer: PatternLayerRecord,

    /// Classifier-layer result
    pub classifier_layer: ClassifierLayerRecord,

    /// Final combined status
    pub status: VerdictStatus,

    /// End-to-end evaluation latency in milliseconds
    pub latency_ms: u64,

    /// Hash of the previous record in the same file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,

    /// Hash of this record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl AuditRecord {
    /// Create a record for one evaluation
    pub fn new(
        audit_id: impl Into<String>,
        fingerprint: impl Into<String>,
        preview: impl Into<String>,
        pattern_layer: PatternLayerRecord,
        classifier_layer: ClassifierLayerRecord,
        status: VerdictStatus,
        latency_ms: u64,
    ) -> Self {
        Self {
            audit_id: audit_id.into(),
            timestamp: Utc::now(),
            fingerprint: fingerprint.into(),
            preview: preview.into(),
            pattern_layer,
            classifier_layer,
            status,
            latency_ms,
            prev_hash: None,
            hash: None,
        }
    }

    /// Compute the chain hash for this record given its predecessor
    pub fn chain_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.audit_id.as_bytes());
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update(self.fingerprint.as_bytes());
        hasher.update(self.status.as_str().as_bytes());
        if let Some(ref prev) = self.prev_hash {
            hasher.update(prev.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AuditRecord {
        AuditRecord::new(
            generate_audit_id(),
            fingerprint("sample content"),
            "sample content",
            PatternLayerRecord {
                categories: vec![ViolationCategory::Phone],
                confidence: 0.9,
                truncated: false,
            },
            ClassifierLayerRecord {
                origin: VerdictOrigin::Remote,
                is_harmful: false,
                severity: Severity::None,
                categories: Vec::new(),
                confidence: 0.8,
            },
            VerdictStatus::Redacted,
            12,
        )
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = fingerprint("same input");
        let b = fingerprint("same input");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert_ne!(a, fingerprint("different input"));
    }

    #[test]
    fn test_audit_ids_are_unique() {
        let a = generate_audit_id();
        let b = generate_audit_id();
        assert!(a.starts_with("aud_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_chain_hash_depends_on_predecessor() {
        let mut record = sample_record();
        let unchained = record.chain_hash();

        record.prev_hash = Some("deadbeef".to_string());
        assert_ne!(unchained, record.chain_hash());
    }

    #[test]
    fn test_record_serializes_to_single_json_object() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains('\n'));

        let back: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.audit_id, record.audit_id);
        assert_eq!(back.status, record.status);
    }
}
