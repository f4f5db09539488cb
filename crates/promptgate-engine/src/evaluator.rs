//! Evaluation gateway
//!
//! The constructed entry point of the pipeline. A [`Gateway`] owns its
//! detector catalog, classifier adapter, redactor, and audit sink, all
//! injected rather than global, and exposes one operation:
//! `evaluate(text)`.
//!
//! Within one call the pattern scan and the classification run
//! concurrently; the combiner is the join point. The audit append is the
//! only shared resource and its failure is logged, never surfaced.
//! `evaluate` always returns a verdict.

use crate::combiner::combine;
use crate::config::GatewayConfig;
use crate::summary::summarize;
use promptgate_audit::{
    fingerprint, generate_audit_id, AuditRecord, AuditSink, ClassifierLayerRecord,
    PatternLayerRecord,
};
use promptgate_classifier::{ClassifierAdapter, CompletionClient};
use promptgate_core::{
    ClassifierVerdict, CombinedVerdict, ExternalSummary, PatternScan, Result, Severity,
    VerdictOrigin, VerdictStatus, ViolationCategory,
};
use promptgate_detectors::{PatternMatcher, Redactor};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Result of one gateway evaluation.
///
/// This is the internal-facing shape consumed by the serving layer; the
/// mandatory sanitization step for anything leaving the trust boundary is
/// [`Evaluation::external`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Final status
    pub status: VerdictStatus,

    /// Content to forward: empty for Block, redacted for Redacted,
    /// otherwise the original text
    pub content: String,

    /// Deduplicated violations from both layers
    pub violations: Vec<ViolationCategory>,

    /// PII categories actually replaced by the redactor
    pub redacted_items: Vec<ViolationCategory>,

    /// Combined confidence
    pub confidence: f32,

    /// Audit correlation id
    pub audit_id: String,

    /// Caller-facing summary
    pub summary: ExternalSummary,
}

impl Evaluation {
    /// Strip internal layer detail for the external caller.
    ///
    /// This must be the last step before any response is emitted across
    /// the trust boundary.
    pub fn external(&self) -> ExternalResponse {
        ExternalResponse {
            status: self.status,
            content: self.content.clone(),
            audit_id: self.audit_id.clone(),
            summary: self.summary.clone(),
        }
    }
}

/// The only shape allowed to cross the trust boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExternalResponse {
    /// Final status
    pub status: VerdictStatus,

    /// Content to forward
    pub content: String,

    /// Audit correlation id
    pub audit_id: String,

    /// Sanitized summary
    #[serde(flatten)]
    pub summary: ExternalSummary,
}

/// Content-safety evaluation gateway
pub struct Gateway {
    matcher: Arc<PatternMatcher>,
    redactor: Redactor,
    adapter: ClassifierAdapter,
    sink: Arc<dyn AuditSink>,
    preview_chars: usize,
}

impl Gateway {
    /// Construct a gateway from its configuration and injected collaborators
    pub fn new(
        config: &GatewayConfig,
        client: Arc<dyn CompletionClient>,
        sink: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let matcher =
            Arc::new(PatternMatcher::bundled()?.with_scan_window(config.scan_window_bytes));
        let redactor = Redactor::new()?;
        let adapter = ClassifierAdapter::new(client, Arc::clone(&matcher))
            .with_timeout(config.classifier_timeout());

        Ok(Self {
            matcher,
            redactor,
            adapter,
            sink,
            preview_chars: config.preview_chars,
        })
    }

    /// Evaluate one submission. Never errors; always returns a verdict.
    pub async fn evaluate(&self, text: &str) -> Evaluation {
        let started = Instant::now();
        let audit_id = generate_audit_id();

        if text.trim().is_empty() {
            return self.fast_allow(text, audit_id, started).await;
        }

        let (scan, verdict) = tokio::join!(
            async { self.matcher.scan(text) },
            self.adapter.classify(text)
        );

        let combined = combine(&scan, &verdict);
        debug!(
            audit_id = %audit_id,
            status = combined.status.as_str(),
            violations = combined.violations.len(),
            "verdict combined"
        );

        let (content, redacted_items) = self.apply_verdict(text, &combined);
        let summary = summarize(&combined, &redacted_items);

        let latency_ms = started.elapsed().as_millis() as u64;
        let record = AuditRecord::new(
            audit_id.clone(),
            fingerprint(text),
            preview_of(text, self.preview_chars),
            pattern_layer_record(&scan),
            classifier_layer_record(&verdict),
            combined.status,
            latency_ms,
        );
        self.append_audit(record).await;

        if combined.status == VerdictStatus::Block {
            info!(audit_id = %audit_id, reason = %combined.reason, "content blocked");
        }

        Evaluation {
            status: combined.status,
            content,
            violations: combined.violations.iter().copied().collect(),
            redacted_items,
            confidence: combined.confidence,
            audit_id,
            summary,
        }
    }

    /// Empty/whitespace submissions skip both layers
    async fn fast_allow(&self, text: &str, audit_id: String, started: Instant) -> Evaluation {
        let combined = CombinedVerdict {
            status: VerdictStatus::Allow,
            violations: BTreeSet::new(),
            confidence: 1.0,
            reason: "empty input".to_string(),
        };
        let summary = summarize(&combined, &[]);

        let record = AuditRecord::new(
            audit_id.clone(),
            fingerprint(text),
            String::new(),
            PatternLayerRecord {
                categories: Vec::new(),
                confidence: 1.0,
                truncated: false,
            },
            ClassifierLayerRecord {
                origin: VerdictOrigin::Skipped,
                is_harmful: false,
                severity: Severity::None,
                categories: Vec::new(),
                confidence: 1.0,
            },
            VerdictStatus::Allow,
            started.elapsed().as_millis() as u64,
        );
        self.append_audit(record).await;

        Evaluation {
            status: VerdictStatus::Allow,
            content: text.to_string(),
            violations: Vec::new(),
            redacted_items: Vec::new(),
            confidence: 1.0,
            audit_id,
            summary,
        }
    }

    /// Produce the outgoing content for a combined verdict
    fn apply_verdict(
        &self,
        text: &str,
        combined: &CombinedVerdict,
    ) -> (String, Vec<ViolationCategory>) {
        match combined.status {
            // Blocked content is never forwarded, whatever was submitted.
            VerdictStatus::Block => (String::new(), Vec::new()),
            VerdictStatus::Redacted => {
                let requested: BTreeSet<ViolationCategory> = combined
                    .violations
                    .iter()
                    .copied()
                    .filter(|category| category.is_pii())
                    .collect();
                let redaction = self.redactor.redact_categories(text, &requested);
                (redaction.text, redaction.categories)
            }
            VerdictStatus::Flag | VerdictStatus::Allow => (text.to_string(), Vec::new()),
        }
    }

    /// Append an audit record; failures are operational, never caller-visible
    async fn append_audit(&self, record: AuditRecord) {
        if let Err(e) = self.sink.append(&record).await {
            error!(
                audit_id = %record.audit_id,
                error = %e,
                "failed to append audit record"
            );
        }
    }
}

fn pattern_layer_record(scan: &PatternScan) -> PatternLayerRecord {
    PatternLayerRecord {
        categories: scan.categories().into_iter().collect(),
        confidence: scan.confidence,
        truncated: scan.truncated,
    }
}

fn classifier_layer_record(verdict: &ClassifierVerdict) -> ClassifierLayerRecord {
    ClassifierLayerRecord {
        origin: verdict.origin,
        is_harmful: verdict.is_harmful,
        severity: verdict.severity,
        categories: verdict.categories.iter().copied().collect(),
        confidence: verdict.confidence,
    }
}

/// First `max_chars` characters of the text, cut at a char boundary
fn preview_of(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
