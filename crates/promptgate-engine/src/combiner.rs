//! Decision combiner
//!
//! Merges the pattern scan and the classifier verdict into one
//! [`CombinedVerdict`]. Deterministic given both inputs; rules are applied
//! in strict precedence order and the first matching rule wins, so adding
//! violations can only move a verdict toward Block, never away from it.

use promptgate_core::{
    ClassifierVerdict, CombinedVerdict, PatternScan, Severity, SuggestedAction, VerdictStatus,
    ViolationCategory,
};
use std::collections::BTreeSet;

/// Combine both layer results into a single verdict.
///
/// Violations are deduplicated across layers by category before the
/// precedence check, so a category reported by both layers counts once.
/// Confidence is the maximum of the two layer confidences: a
/// high-confidence detection is not diluted by the other layer's silence.
pub fn combine(scan: &PatternScan, verdict: &ClassifierVerdict) -> CombinedVerdict {
    let mut violations: BTreeSet<ViolationCategory> = scan.categories();
    violations.extend(verdict.categories.iter().copied());

    let confidence = scan.confidence.max(verdict.confidence);

    // Rule 1: Block. Critical categories from either layer, or the
    // classifier reporting high-severity harm.
    let critical: Vec<&'static str> = violations
        .iter()
        .filter(|category| category.is_critical())
        .map(|category| category.as_str())
        .collect();

    if !critical.is_empty() {
        return CombinedVerdict {
            status: VerdictStatus::Block,
            violations,
            confidence,
            reason: format!("critical categories present: {}", critical.join(", ")),
        };
    }

    if verdict.is_harmful && verdict.severity >= Severity::High {
        return CombinedVerdict {
            status: VerdictStatus::Block,
            violations,
            confidence,
            reason: format!(
                "classifier reported harmful content at {:?} severity",
                verdict.severity
            ),
        };
    }

    // Rule 2: Redacted. Only PII categories remain, and the pattern layer
    // produced spans to drive the redaction. PII claimed solely by the
    // classifier is unverifiable locally and falls through to Flag.
    let only_pii = !violations.is_empty() && violations.iter().all(|c| c.is_pii());
    if only_pii && !scan.pii_hits().is_empty() {
        let names: Vec<_> = violations.iter().map(|c| c.as_str()).collect();
        return CombinedVerdict {
            status: VerdictStatus::Redacted,
            violations,
            confidence,
            reason: format!("pii categories redacted: {}", names.join(", ")),
        };
    }

    // Rule 3: Flag. Any residual violation or advisory escalation.
    let advisory_flag = verdict.is_harmful
        || verdict.severity == Severity::Medium
        || matches!(
            verdict.suggested_action,
            SuggestedAction::Flag | SuggestedAction::Block
        );

    if !violations.is_empty() || advisory_flag || scan.truncated {
        let reason = if scan.truncated && violations.is_empty() && !advisory_flag {
            "input exceeded scan window; unable to fully analyze".to_string()
        } else if violations.is_empty() {
            "classifier advisory escalation without local findings".to_string()
        } else {
            let names: Vec<_> = violations.iter().map(|c| c.as_str()).collect();
            format!("non-critical violations flagged: {}", names.join(", "))
        };

        return CombinedVerdict {
            status: VerdictStatus::Flag,
            violations,
            confidence,
            reason,
        };
    }

    // Rule 4: Allow.
    CombinedVerdict {
        status: VerdictStatus::Allow,
        violations,
        confidence,
        reason: "no violations from either layer".to_string(),
    }
}
