//! Summary generator
//!
//! Maps the internal combined verdict onto the caller-facing
//! [`ExternalSummary`]. This is the sanitization boundary: the mapping from
//! categories to policy areas is many-to-one and coarse so an external
//! caller cannot reverse-engineer which detector fired, and the
//! human-readable text is built only from those coarse labels.

use promptgate_core::{CombinedVerdict, ConfidenceLevel, ExternalSummary, VerdictStatus, ViolationCategory};

/// Coarse policy area for a violation category.
///
/// Deliberately lossy: several categories share one label.
pub fn policy_area(category: ViolationCategory) -> &'static str {
    use ViolationCategory::*;
    match category {
        NationalId | Iban | Phone | Email | Passport => "personal information protection",
        PromptInjection | CodeInjection | DataExfiltration => "security policy",
        Toxicity | ViolentThreat | ReligiousInsult => "community standards",
        ReligiousFabrication | PoliticalDisinformation => "content integrity",
    }
}

/// Bucket a confidence score for external consumption
pub fn confidence_level(confidence: f32) -> ConfidenceLevel {
    if confidence >= 0.85 {
        ConfidenceLevel::High
    } else if confidence >= 0.6 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Produce the external summary for a verdict.
///
/// Pure function, regenerated fresh on every call; never persisted.
pub fn summarize(
    verdict: &CombinedVerdict,
    redacted: &[ViolationCategory],
) -> ExternalSummary {
    let areas = dedup_areas(verdict.violations.iter().copied());
    let modifications = dedup_areas(redacted.iter().copied());
    let modifications_applied = !modifications.is_empty();

    let summary = match verdict.status {
        VerdictStatus::Allow => {
            "Content meets the usage policy and was forwarded unchanged.".to_string()
        }
        VerdictStatus::Redacted => {
            "Content was forwarded after personal information was replaced with placeholders."
                .to_string()
        }
        VerdictStatus::Flag => {
            if areas.is_empty() {
                "Content was forwarded but marked for review under the usage policy.".to_string()
            } else {
                format!(
                    "Content was forwarded but marked for review under: {}.",
                    areas.join(", ")
                )
            }
        }
        VerdictStatus::Block => {
            if areas.is_empty() {
                "Content was withheld under the usage policy.".to_string()
            } else {
                format!("Content was withheld under: {}.", areas.join(", "))
            }
        }
    };

    ExternalSummary {
        permitted: verdict.status != VerdictStatus::Block,
        policy_compliant: verdict.status == VerdictStatus::Allow,
        modifications_applied,
        modifications,
        confidence_level: confidence_level(verdict.confidence),
        summary,
    }
}

/// Deduplicate categories into their coarse policy areas, stable order
fn dedup_areas(categories: impl Iterator<Item = ViolationCategory>) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    for category in categories {
        let area = policy_area(category);
        if !areas.iter().any(|existing| existing == area) {
            areas.push(area.to_string());
        }
    }
    areas
}
