//! abuse.ch URLhaus lookups (match-list family).

use super::ensure_success;
use crate::error::LookupError;
use crate::models::SourcePayload;
use serde::Deserialize;

const API_URL: &str = "https://urlhaus-api.abuse.ch/v1/url/";

#[derive(Debug, Deserialize)]
struct UrlResponse {
    query_status: String,
    #[serde(default)]
    threat: Option<String>,
}

/// Ask URLhaus whether `url` is a known malware distribution URL.
pub async fn lookup(
    client: &reqwest::Client,
    auth_key: &str,
    url: &str,
) -> Result<SourcePayload, LookupError> {
    let response = client
        .post(API_URL)
        .header("Auth-Key", auth_key)
        .form(&[("url", url)])
        .send()
        .await?;

    let answer: UrlResponse = ensure_success(response)?.json().await?;
    payload_from(answer)
}

fn payload_from(answer: UrlResponse) -> Result<SourcePayload, LookupError> {
    match answer.query_status.as_str() {
        "ok" => Ok(SourcePayload::Matches {
            entries: vec![answer
                .threat
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "listed".to_string())],
        }),
        "no_results" => Ok(SourcePayload::Matches { entries: vec![] }),
        other => Err(LookupError::Rejected(other.to_string())),
    }
}
