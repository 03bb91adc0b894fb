//! Per-family interpretation of raw source findings.
//!
//! Each family has its own pure rule for mapping a payload onto a confidence
//! tier. Callers are expected to run the classifier first; this module only
//! ever sees results that carry a payload.

use crate::error::EngineError;
use crate::models::{
    NormalizedSignal, RawSourceResult, SignalVerdict, SourceFamily, SourceId, SourcePayload,
};

/// Minimum number of flagging engines for a consensus finding.
pub const ENGINE_CONSENSUS: u32 = 2;

/// Tags that make a reputation-pulse report count as real evidence.
pub const MALICIOUS_TAGS: [&str; 13] = [
    "malware",
    "phishing",
    "malicious",
    "trojan",
    "ransomware",
    "botnet",
    "virus",
    "exploit",
    "spyware",
    "c2",
    "cnc",
    "command and control",
    "command-and-control",
];

/// Normalize a raw finding by dispatching on the source's family.
pub fn normalize(raw: &RawSourceResult) -> Result<NormalizedSignal, EngineError> {
    let source = raw.source;
    match (source.family(), &raw.payload) {
        (
            SourceFamily::ReputationScore,
            SourcePayload::EngineStats {
                malicious,
                suspicious,
                total,
            },
        ) => Ok(normalize_engine_stats(source, *malicious, *suspicious, *total)),
        (SourceFamily::MatchList, SourcePayload::Matches { entries }) => {
            Ok(normalize_matches(source, entries))
        }
        (SourceFamily::ReputationPulse, SourcePayload::Pulses { count, tags }) => {
            Ok(normalize_pulses(source, *count, tags))
        }
        (expected, payload) => Err(EngineError::FamilyMismatch {
            id: source,
            expected,
            actual: payload
                .family()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "empty".to_string()),
        }),
    }
}

/// Reputation-score rule: two or more engines is a consensus, one is a
/// minority opinion.
pub fn normalize_engine_stats(
    source: SourceId,
    malicious: u32,
    suspicious: u32,
    total: Option<u32>,
) -> NormalizedSignal {
    let verdict = match malicious {
        0 => SignalVerdict::Clean,
        n if n >= ENGINE_CONSENSUS => SignalVerdict::Positive,
        _ => SignalVerdict::WeakPositive,
    };

    let mut rationale = format!("Malicious: {}, Suspicious: {}", malicious, suspicious);
    if let Some(total) = total {
        rationale.push_str(&format!(" (of {} engines)", total));
    }

    NormalizedSignal {
        source,
        verdict,
        rationale,
        raw_evidence_count: Some(malicious),
        evidence_total: total,
    }
}

/// Match-list rule: any entry is a hit.
pub fn normalize_matches(source: SourceId, entries: &[String]) -> NormalizedSignal {
    let (verdict, rationale) = if entries.is_empty() {
        (SignalVerdict::Clean, "Clean".to_string())
    } else {
        (
            SignalVerdict::Positive,
            format!("Matches: {}", entries.join(", ")),
        )
    };

    NormalizedSignal {
        source,
        verdict,
        rationale,
        raw_evidence_count: Some(evidence_count(entries.len())),
        evidence_total: None,
    }
}

/// Entry count clamped to the `u32` evidence field.
fn evidence_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Reputation-pulse rule: reports alone only raise suspicion; a report has
/// to carry a malicious category tag to count as a hit.
pub fn normalize_pulses(source: SourceId, count: u32, tags: &[String]) -> NormalizedSignal {
    let malicious_tags = malicious_tags(tags);

    let verdict = if count == 0 {
        SignalVerdict::Clean
    } else if !malicious_tags.is_empty() {
        SignalVerdict::Positive
    } else {
        SignalVerdict::WeakPositive
    };

    let rationale = match verdict {
        SignalVerdict::Clean => "No threat reports".to_string(),
        SignalVerdict::Positive => format!(
            "{} threat reports; malicious tags: {}",
            count,
            malicious_tags.join(", ")
        ),
        _ if tags.is_empty() => format!("{} threat reports; no tags", count),
        _ => format!("{} threat reports; tags: {}", count, tags.join(", ")),
    };

    NormalizedSignal {
        source,
        verdict,
        rationale,
        raw_evidence_count: Some(count),
        evidence_total: None,
    }
}

/// Tags (lower-cased, trimmed) that belong to the malicious vocabulary.
fn malicious_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| MALICIOUS_TAGS.contains(&t.as_str()))
        .collect()
}
