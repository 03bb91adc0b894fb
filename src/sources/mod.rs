//! Threat-intelligence lookups.
//!
//! Each provider module turns one HTTP exchange into a `SourcePayload`.
//! `SourceClient` runs the enabled lookups concurrently and folds every
//! failure into a flagged `RawSourceResult`, so a slow or broken provider
//! never blocks or invalidates the others.

pub mod otx;
pub mod safe_browsing;
pub mod urlhaus;
pub mod virustotal;

use crate::analysis::{self, Assessment};
use crate::config::{CredentialsConfig, SourcesConfig};
use crate::error::{EngineError, LookupError};
use crate::models::{RawSourceResult, SourceId, SourcePayload};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info};

/// Client for every configured threat-intelligence source.
pub struct SourceClient {
    http_client: reqwest::Client,
    credentials: CredentialsConfig,
}

impl SourceClient {
    /// Create a client with the configured timeout and user agent.
    pub fn new(config: &SourcesConfig, credentials: CredentialsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            credentials,
        })
    }

    /// Query one source. Never fails: problems are reported through flags.
    pub async fn lookup(&self, source: SourceId, url: &str) -> RawSourceResult {
        let Some(key) = self.credentials.get(source) else {
            debug!("{} has no credential configured, skipping", source);
            return RawSourceResult::credential_missing(source);
        };

        let outcome: Result<SourcePayload, LookupError> = match source {
            SourceId::VirusTotal => virustotal::lookup(&self.http_client, key, url).await,
            SourceId::GoogleSafeBrowsing => {
                safe_browsing::lookup(&self.http_client, key, url).await
            }
            SourceId::AlienVaultOtx => otx::lookup(&self.http_client, key, url).await,
            SourceId::UrlHaus => urlhaus::lookup(&self.http_client, key, url).await,
        };

        match outcome {
            Ok(payload) => {
                debug!("{} answered: {:?}", source, payload);
                RawSourceResult::found(source, payload)
            }
            Err(e) => RawSourceResult::transport_failure(source, e.to_string()),
        }
    }

    /// Query all `sources` in parallel; results keep the order of `sources`.
    pub async fn lookup_all(&self, sources: &[SourceId], url: &str) -> Vec<RawSourceResult> {
        info!("Querying {} sources", sources.len());
        join_all(sources.iter().map(|source| self.lookup(*source, url))).await
    }

    /// Query `sources` and assess `url` once every lookup has settled.
    pub async fn analyze(&self, sources: &[SourceId], url: &str) -> Result<Assessment, EngineError> {
        let raw_results = self.lookup_all(sources, url).await;
        analysis::assess(url, &raw_results)
    }
}

/// Reject non-success responses before decoding them.
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(LookupError::Status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(credentials: CredentialsConfig) -> SourceClient {
        SourceClient::new(&SourcesConfig::default(), credentials).unwrap()
    }

    #[test]
    fn test_missing_credentials_never_touch_the_network() {
        let client = client(CredentialsConfig::default());
        let sources = [
            SourceId::VirusTotal,
            SourceId::GoogleSafeBrowsing,
            SourceId::AlienVaultOtx,
            SourceId::UrlHaus,
        ];

        let results = tokio_test::block_on(client.lookup_all(&sources, "https://example.com"));

        assert_eq!(results.len(), 4);
        for (result, source) in results.iter().zip(sources) {
            assert_eq!(result.source, source);
            assert!(result.credential_missing);
            assert!(!result.transport_error);
        }
    }

    #[test]
    fn test_otx_without_host_fails_before_any_request() {
        let client = client(CredentialsConfig {
            alienvault_otx: Some("key".to_string()),
            ..Default::default()
        });

        let result = tokio_test::block_on(client.lookup(SourceId::AlienVaultOtx, "not a url"));

        assert!(result.transport_error);
        assert_eq!(result.failure.as_deref(), Some("no domain to look up"));
        assert_eq!(result.payload, SourcePayload::Empty);
    }

    #[test]
    fn test_analyze_without_credentials_is_suspect() {
        let client = client(CredentialsConfig::default());
        let sources = [SourceId::VirusTotal, SourceId::GoogleSafeBrowsing];

        let assessment =
            tokio_test::block_on(client.analyze(&sources, "https://example.com")).unwrap();

        assert_eq!(assessment.verdict.score, crate::models::Score::Suspect);
        assert_eq!(
            assessment.verdict.reasons,
            vec!["Sources unavailable: VirusTotal, Google Safe Browsing"]
        );
    }

    #[test]
    fn test_empty_source_list() {
        let client = client(CredentialsConfig::default());
        let results = tokio_test::block_on(client.lookup_all(&[], "https://example.com"));
        assert!(results.is_empty());
    }
}
