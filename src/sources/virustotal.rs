//! VirusTotal URL reports (reputation-score family).

use super::ensure_success;
use crate::error::LookupError;
use crate::models::SourcePayload;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::collections::BTreeMap;

const API_URL: &str = "https://www.virustotal.com/api/v3/urls";

#[derive(Debug, Deserialize)]
struct UrlReport {
    data: UrlData,
}

#[derive(Debug, Deserialize)]
struct UrlData {
    attributes: UrlAttributes,
}

#[derive(Debug, Deserialize)]
struct UrlAttributes {
    #[serde(default)]
    last_analysis_stats: BTreeMap<String, u32>,
}

/// VirusTotal identifies URLs by their unpadded URL-safe base64 encoding.
pub fn url_id(url: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Fetch the last analysis of `url`.
///
/// A URL VirusTotal has never scanned comes back as 404 and is reported as a
/// failed lookup rather than a clean one.
pub async fn lookup(
    client: &reqwest::Client,
    api_key: &str,
    url: &str,
) -> Result<SourcePayload, LookupError> {
    let response = client
        .get(format!("{}/{}", API_URL, url_id(url)))
        .header("x-apikey", api_key)
        .send()
        .await?;

    let report: UrlReport = ensure_success(response)?.json().await?;
    Ok(payload_from(&report.data.attributes.last_analysis_stats))
}

fn payload_from(stats: &BTreeMap<String, u32>) -> SourcePayload {
    let count = |key: &str| stats.get(key).copied().unwrap_or(0);
    let total = stats.values().fold(0u32, |acc, n| acc.saturating_add(*n));

    SourcePayload::EngineStats {
        malicious: count("malicious"),
        suspicious: count("suspicious"),
        total: (total > 0).then_some(total),
    }
}
