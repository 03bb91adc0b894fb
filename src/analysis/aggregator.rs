//! Verdict aggregation.
//!
//! Combines heuristic results and normalized signals into a single score with
//! ordered reasons. Precedence, highest first:
//!
//! 1. any `positive` signal: malicious
//! 2. any failed heuristic, `weak-positive` or `unavailable` signal: suspect
//! 3. otherwise: safe
//!
//! Reasons are always collected in full, whatever the score.

use crate::models::{
    HeuristicResult, NormalizedSignal, Score, SignalVerdict, SourceFamily, Verdict,
};
use tracing::debug;

/// Aggregate heuristics and signals into a verdict.
pub fn aggregate(heuristics: &[HeuristicResult], signals: &[NormalizedSignal]) -> Verdict {
    let score = score(heuristics, signals);
    let reasons = collect_reasons(heuristics, signals);

    debug!(
        "Aggregated {} heuristics and {} signals into {} ({} reasons)",
        heuristics.len(),
        signals.len(),
        score,
        reasons.len()
    );

    Verdict { score, reasons }
}

fn score(heuristics: &[HeuristicResult], signals: &[NormalizedSignal]) -> Score {
    let has = |verdict: SignalVerdict| signals.iter().any(|s| s.verdict == verdict);

    if has(SignalVerdict::Positive) {
        Score::Malicious
    } else if heuristics.iter().any(|h| !h.matched)
        || has(SignalVerdict::WeakPositive)
        || has(SignalVerdict::Unavailable)
    {
        Score::Suspect
    } else {
        Score::Safe
    }
}

fn collect_reasons(heuristics: &[HeuristicResult], signals: &[NormalizedSignal]) -> Vec<String> {
    let mut reasons: Vec<String> = heuristics
        .iter()
        .filter(|h| !h.matched)
        .map(|h| h.details.clone())
        .collect();

    let weak = |family: SourceFamily| {
        signals
            .iter()
            .filter(move |s| s.verdict == SignalVerdict::WeakPositive && s.source.family() == family)
    };

    reasons.extend(weak(SourceFamily::ReputationScore).map(minority_opinion_note));
    reasons.extend(weak(SourceFamily::ReputationPulse).map(uncategorized_reports_note));

    let unavailable: Vec<String> = signals
        .iter()
        .filter(|s| s.verdict == SignalVerdict::Unavailable)
        .map(|s| s.source.to_string())
        .collect();
    if !unavailable.is_empty() {
        reasons.push(format!("Sources unavailable: {}", unavailable.join(", ")));
    }

    reasons
}

/// Note for a single-engine reputation-score finding.
pub fn minority_opinion_note(signal: &NormalizedSignal) -> String {
    let flagged = signal.raw_evidence_count.unwrap_or(1);
    let engines = if flagged == 1 { "engine" } else { "engines" };
    match signal.evidence_total {
        Some(total) => format!(
            "{}: {} of {} engines flagged this link (minority opinion, suspicion only)",
            signal.source, flagged, total
        ),
        None => format!(
            "{}: {} {} flagged this link (minority opinion, suspicion only)",
            signal.source, flagged, engines
        ),
    }
}

/// Note for reputation-pulse reports that carry no malicious category.
pub fn uncategorized_reports_note(signal: &NormalizedSignal) -> String {
    format!(
        "{}: domain appears in {} threat reports without a malicious category (suspicion only)",
        signal.source,
        signal.raw_evidence_count.unwrap_or(0)
    )
}

/// Whether the verdict reaches `threshold`.
pub fn at_or_above(verdict: &Verdict, threshold: Score) -> bool {
    verdict.score >= threshold
}
