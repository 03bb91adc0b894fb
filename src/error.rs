//! Typed errors raised by the verdict engine.
//!
//! Ordinary outcomes (malicious, suspect, unavailable sources) are values,
//! not errors. The only thing the engine refuses to turn into a verdict is a
//! caller handing it data that breaks the lookup contract. Lookup failures
//! have their own type and are always recovered from.

use crate::models::{SourceFamily, SourceId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A lookup produced a payload shaped for a different source family.
    #[error("{id} is a {expected} source but returned a {actual} payload")]
    FamilyMismatch {
        id: SourceId,
        expected: SourceFamily,
        actual: String,
    },
}

/// Why a single source lookup produced no finding.
///
/// These never escape the lookup layer: they are folded into a
/// `RawSourceResult` with its `transport_error` flag set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("cannot connect to provider")]
    Connect,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider answered '{0}'")]
    Rejected(String),

    #[error("no domain to look up")]
    NoHost,

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_connect() {
            LookupError::Connect
        } else if e.is_decode() {
            LookupError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            LookupError::Status(status.as_u16())
        } else {
            LookupError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_mismatch_message() {
        let err = EngineError::FamilyMismatch {
            id: SourceId::UrlHaus,
            expected: SourceFamily::MatchList,
            actual: "reputation-pulse".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "URLhaus is a match-list source but returned a reputation-pulse payload"
        );
    }

    #[test]
    fn test_lookup_error_messages() {
        assert_eq!(LookupError::Status(404).to_string(), "HTTP 404");
        assert_eq!(LookupError::Timeout.to_string(), "request timed out");
        assert_eq!(
            LookupError::Rejected("invalid_url".to_string()).to_string(),
            "provider answered 'invalid_url'"
        );
    }
}
