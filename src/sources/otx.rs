//! AlienVault OTX pulses (reputation-pulse family).
//!
//! OTX is keyed by host, not by full URL, so every link on a busy domain
//! shares the same pulse history.

use super::ensure_success;
use crate::error::LookupError;
use crate::heuristics::extract_host;
use crate::models::SourcePayload;
use serde::Deserialize;
use std::net::IpAddr;

const API_URL: &str = "https://otx.alienvault.com/api/v1/indicators";

#[derive(Debug, Deserialize)]
struct GeneralResponse {
    #[serde(default)]
    pulse_info: PulseInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PulseInfo {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    pulses: Vec<Pulse>,
}

#[derive(Debug, Deserialize)]
struct Pulse {
    #[serde(default)]
    tags: Vec<String>,
}

/// Indicator section and value for a host.
fn indicator(host: &str) -> (&'static str, &str) {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => ("IPv4", bare),
        Ok(IpAddr::V6(_)) => ("IPv6", bare),
        Err(_) => ("domain", host),
    }
}

/// Fetch the pulse summary for the host of `url`.
pub async fn lookup(
    client: &reqwest::Client,
    api_key: &str,
    url: &str,
) -> Result<SourcePayload, LookupError> {
    let host = extract_host(url);
    if host.is_empty() {
        return Err(LookupError::NoHost);
    }

    let (section, value) = indicator(&host);
    let response = client
        .get(format!("{}/{}/{}/general", API_URL, section, value))
        .header("X-OTX-API-KEY", api_key)
        .send()
        .await?;

    let general: GeneralResponse = ensure_success(response)?.json().await?;
    Ok(payload_from(general.pulse_info))
}

/// Report count plus the union of all pulse tags, first occurrence first.
fn payload_from(info: PulseInfo) -> SourcePayload {
    let mut tags: Vec<String> = Vec::new();
    for tag in info.pulses.into_iter().flat_map(|p| p.tags) {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }

    SourcePayload::Pulses {
        count: info.count,
        tags,
    }
}
