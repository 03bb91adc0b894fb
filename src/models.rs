//! Data models for the link checker.
//!
//! This module contains the core data structures shared by the heuristics,
//! the source lookups, the verdict engine and the report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a single local heuristic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicResult {
    /// Rule identifier (e.g. "HTTPS").
    pub rule: String,
    /// `true` when the URL passes the rule.
    pub matched: bool,
    /// Human-readable explanation of the outcome.
    pub details: String,
}

impl HeuristicResult {
    pub fn pass(rule: &str, details: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            matched: true,
            details: details.into(),
        }
    }

    pub fn fail(rule: &str, details: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            matched: false,
            details: details.into(),
        }
    }
}

/// Identity of an external threat-intelligence source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "virustotal")]
    VirusTotal,
    #[serde(rename = "google_safe_browsing")]
    GoogleSafeBrowsing,
    #[serde(rename = "alienvault_otx")]
    AlienVaultOtx,
    #[serde(rename = "urlhaus")]
    UrlHaus,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::VirusTotal,
        SourceId::GoogleSafeBrowsing,
        SourceId::AlienVaultOtx,
        SourceId::UrlHaus,
    ];

    /// Identifier used in config files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            SourceId::VirusTotal => "virustotal",
            SourceId::GoogleSafeBrowsing => "google_safe_browsing",
            SourceId::AlienVaultOtx => "alienvault_otx",
            SourceId::UrlHaus => "urlhaus",
        }
    }

    /// How this source's findings have to be interpreted.
    pub fn family(&self) -> SourceFamily {
        match self {
            SourceId::VirusTotal => SourceFamily::ReputationScore,
            SourceId::GoogleSafeBrowsing | SourceId::UrlHaus => SourceFamily::MatchList,
            SourceId::AlienVaultOtx => SourceFamily::ReputationPulse,
        }
    }

    /// Environment variable holding the credential for this source.
    pub fn credential_env(&self) -> &'static str {
        match self {
            SourceId::VirusTotal => "VT_API_KEY",
            SourceId::GoogleSafeBrowsing => "GSB_API_KEY",
            SourceId::AlienVaultOtx => "OTX_API_KEY",
            SourceId::UrlHaus => "URLHAUS_AUTH_KEY",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::VirusTotal => write!(f, "VirusTotal"),
            SourceId::GoogleSafeBrowsing => write!(f, "Google Safe Browsing"),
            SourceId::AlienVaultOtx => write!(f, "AlienVault OTX"),
            SourceId::UrlHaus => write!(f, "URLhaus"),
        }
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SourceId::ALL
            .into_iter()
            .find(|id| id.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = SourceId::ALL.iter().map(|id| id.key()).collect();
                format!("Unknown source '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Families of sources that share a normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFamily {
    /// Multi-engine scanner reporting how many engines flagged the URL.
    ReputationScore,
    /// Blocklist reporting zero or more match entries.
    MatchList,
    /// Community feed reporting tagged threat reports about the domain.
    ReputationPulse,
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFamily::ReputationScore => write!(f, "reputation-score"),
            SourceFamily::MatchList => write!(f, "match-list"),
            SourceFamily::ReputationPulse => write!(f, "reputation-pulse"),
        }
    }
}

/// Provider-specific data extracted from a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourcePayload {
    /// Per-engine tallies from a reputation-score source.
    EngineStats {
        malicious: u32,
        suspicious: u32,
        total: Option<u32>,
    },
    /// Entries reported by a match-list source.
    Matches { entries: Vec<String> },
    /// Report count and attached tags from a reputation-pulse source.
    Pulses { count: u32, tags: Vec<String> },
    /// Nothing usable came back (credential missing or transport failure).
    Empty,
}

impl SourcePayload {
    /// Family this payload shape belongs to, if any.
    pub fn family(&self) -> Option<SourceFamily> {
        match self {
            SourcePayload::EngineStats { .. } => Some(SourceFamily::ReputationScore),
            SourcePayload::Matches { .. } => Some(SourceFamily::MatchList),
            SourcePayload::Pulses { .. } => Some(SourceFamily::ReputationPulse),
            SourcePayload::Empty => None,
        }
    }
}

/// Raw outcome of one source lookup, as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSourceResult {
    pub source: SourceId,
    pub payload: SourcePayload,
    /// The lookup failed (non-success status, timeout, malformed response).
    pub transport_error: bool,
    /// No credential was configured, so the source was never contacted.
    pub credential_missing: bool,
    /// Short description of the failure, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RawSourceResult {
    /// A lookup that returned a usable payload.
    pub fn found(source: SourceId, payload: SourcePayload) -> Self {
        Self {
            source,
            payload,
            transport_error: false,
            credential_missing: false,
            failure: None,
        }
    }

    /// A source that has no credential configured.
    pub fn credential_missing(source: SourceId) -> Self {
        Self {
            source,
            payload: SourcePayload::Empty,
            transport_error: false,
            credential_missing: true,
            failure: None,
        }
    }

    /// A lookup that failed in transit or returned garbage.
    pub fn transport_failure(source: SourceId, reason: impl Into<String>) -> Self {
        Self {
            source,
            payload: SourcePayload::Empty,
            transport_error: true,
            credential_missing: false,
            failure: Some(reason.into()),
        }
    }
}

/// Confidence tier of a normalized signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalVerdict {
    Clean,
    WeakPositive,
    Positive,
    Unavailable,
}

impl fmt::Display for SignalVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalVerdict::Clean => write!(f, "clean"),
            SignalVerdict::WeakPositive => write!(f, "weak-positive"),
            SignalVerdict::Positive => write!(f, "positive"),
            SignalVerdict::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl SignalVerdict {
    /// Returns an emoji representation of the tier.
    pub fn emoji(&self) -> &'static str {
        match self {
            SignalVerdict::Clean => "🟢",
            SignalVerdict::WeakPositive => "🟡",
            SignalVerdict::Positive => "🔴",
            SignalVerdict::Unavailable => "⚪",
        }
    }
}

/// A source's finding translated into a comparable confidence tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSignal {
    pub source: SourceId,
    pub verdict: SignalVerdict,
    pub rationale: String,
    /// Number of flagging engines or reports behind the finding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_evidence_count: Option<u32>,
    /// Size of the population the evidence count was drawn from (e.g. engines consulted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_total: Option<u32>,
}

/// Final three-level score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Safe,
    Suspect,
    Malicious,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Safe => write!(f, "safe"),
            Score::Suspect => write!(f, "suspect"),
            Score::Malicious => write!(f, "malicious"),
        }
    }
}

impl Score {
    /// Returns an emoji representation of the score.
    pub fn emoji(&self) -> &'static str {
        match self {
            Score::Safe => "✅",
            Score::Suspect => "⚠️",
            Score::Malicious => "⛔",
        }
    }
}

/// The engine's answer: a score plus the ordered reasons behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub score: Score,
    pub reasons: Vec<String>,
}

/// Metadata about a link report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// The URL that was assessed.
    pub url: String,
    /// Host extracted from the URL (empty when none could be extracted).
    pub host: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Number of sources queried.
    pub sources_queried: usize,
    /// Number of sources that produced no finding.
    pub sources_unavailable: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
    /// Version of the tool that produced the report.
    pub tool_version: String,
}

/// The complete link report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub heuristics: Vec<HeuristicResult>,
    pub signals: Vec<NormalizedSignal>,
    pub verdict: Verdict,
}
