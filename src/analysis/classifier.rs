//! Separates real findings from lookups that produced nothing.
//!
//! Classification relies only on the explicit flags set by the lookup layer,
//! never on the text of a response.

use crate::models::{NormalizedSignal, RawSourceResult, SignalVerdict};

/// Why a source could not produce a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    CredentialMissing,
    TransportFailed(String),
}

/// Decide whether `raw` carries a finding at all.
///
/// A missing credential wins over a transport error: a source that was never
/// configured was never contacted.
pub fn classify(raw: &RawSourceResult) -> Availability {
    if raw.credential_missing {
        Availability::CredentialMissing
    } else if raw.transport_error {
        Availability::TransportFailed(
            raw.failure
                .clone()
                .unwrap_or_else(|| "lookup failed".to_string()),
        )
    } else {
        Availability::Available
    }
}

/// Build the `unavailable` signal for `raw`, or `None` when it holds a finding.
pub fn unavailable_signal(raw: &RawSourceResult) -> Option<NormalizedSignal> {
    let reason = match classify(raw) {
        Availability::Available => return None,
        Availability::CredentialMissing => format!(
            "API key missing (set {})",
            raw.source.credential_env()
        ),
        Availability::TransportFailed(reason) => format!("lookup failed: {}", reason),
    };

    Some(NormalizedSignal {
        source: raw.source,
        verdict: SignalVerdict::Unavailable,
        rationale: format!("{} unavailable: {}", raw.source, reason),
        raw_evidence_count: None,
        evidence_total: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceId, SourcePayload};

    #[test]
    fn test_found_result_is_available() {
        let raw = RawSourceResult::found(
            SourceId::GoogleSafeBrowsing,
            SourcePayload::Matches { entries: vec![] },
        );
        assert_eq!(classify(&raw), Availability::Available);
        assert!(unavailable_signal(&raw).is_none());
    }

    #[test]
    fn test_missing_credential() {
        let raw = RawSourceResult::credential_missing(SourceId::VirusTotal);
        let signal = unavailable_signal(&raw).unwrap();
        assert_eq!(signal.verdict, SignalVerdict::Unavailable);
        assert_eq!(
            signal.rationale,
            "VirusTotal unavailable: API key missing (set VT_API_KEY)"
        );
    }

    #[test]
    fn test_transport_failure() {
        let raw = RawSourceResult::transport_failure(SourceId::AlienVaultOtx, "HTTP 503");
        assert_eq!(
            classify(&raw),
            Availability::TransportFailed("HTTP 503".to_string())
        );
        let signal = unavailable_signal(&raw).unwrap();
        assert_eq!(
            signal.rationale,
            "AlienVault OTX unavailable: lookup failed: HTTP 503"
        );
    }

    #[test]
    fn test_error_like_text_in_payload_is_not_a_failure() {
        let raw = RawSourceResult::found(
            SourceId::AlienVaultOtx,
            SourcePayload::Pulses {
                count: 1,
                tags: vec!["api error".to_string(), "api key missing".to_string()],
            },
        );
        assert_eq!(classify(&raw), Availability::Available);
    }

    #[test]
    fn test_credential_missing_wins() {
        let mut raw = RawSourceResult::credential_missing(SourceId::UrlHaus);
        raw.transport_error = true;
        assert_eq!(classify(&raw), Availability::CredentialMissing);
    }
}
