//! Signal normalization and verdict aggregation.
//!
//! Everything in here is synchronous and pure: the same URL and the same raw
//! lookup results always produce the same assessment.

pub mod aggregator;
pub mod classifier;
pub mod normalizer;

pub use aggregator::{aggregate, at_or_above};

use crate::error::EngineError;
use crate::heuristics;
use crate::models::{HeuristicResult, NormalizedSignal, RawSourceResult, SignalVerdict, Verdict};
use tracing::{debug, warn};

/// Everything the engine derived for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub heuristics: Vec<HeuristicResult>,
    pub signals: Vec<NormalizedSignal>,
    pub verdict: Verdict,
}

/// Turn one raw lookup result into exactly one signal.
///
/// Unavailable sources are caught before normalization so they can never be
/// mistaken for a clean finding.
pub fn signal_for(raw: &RawSourceResult) -> Result<NormalizedSignal, EngineError> {
    let signal = match classifier::unavailable_signal(raw) {
        Some(unavailable) => unavailable,
        None => normalizer::normalize(raw)?,
    };

    if signal.verdict == SignalVerdict::Unavailable {
        warn!("{}", signal.rationale);
    } else {
        debug!("{} -> {} ({})", signal.source, signal.verdict, signal.rationale);
    }

    Ok(signal)
}

/// Assess `url` given the settled results of every queried source.
pub fn assess(url: &str, raw_results: &[RawSourceResult]) -> Result<Assessment, EngineError> {
    let heuristics = heuristics::evaluate(url);
    let signals = raw_results
        .iter()
        .map(signal_for)
        .collect::<Result<Vec<_>, _>>()?;
    let verdict = aggregate(&heuristics, &signals);

    Ok(Assessment {
        heuristics,
        signals,
        verdict,
    })
}
