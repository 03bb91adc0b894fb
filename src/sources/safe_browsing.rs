//! Google Safe Browsing threat matches (match-list family).

use super::ensure_success;
use crate::error::LookupError;
use crate::models::SourcePayload;
use serde::Deserialize;
use serde_json::{json, Value};

const API_URL: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";

const THREAT_TYPES: [&str; 4] = [
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

#[derive(Debug, Default, Deserialize)]
struct FindResponse {
    #[serde(default)]
    matches: Vec<ThreatMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatch {
    threat_type: String,
}

fn request_body(url: &str) -> Value {
    json!({
        "client": {
            "clientId": "linkguard",
            "clientVersion": env!("CARGO_PKG_VERSION"),
        },
        "threatInfo": {
            "threatTypes": THREAT_TYPES,
            "platformTypes": ["ANY_PLATFORM"],
            "threatEntryTypes": ["URL"],
            "threatEntries": [{ "url": url }],
        },
    })
}

/// Ask Safe Browsing whether `url` is on any of its threat lists.
pub async fn lookup(
    client: &reqwest::Client,
    api_key: &str,
    url: &str,
) -> Result<SourcePayload, LookupError> {
    let response = client
        .post(API_URL)
        .query(&[("key", api_key)])
        .json(&request_body(url))
        .send()
        .await?;

    let found: FindResponse = ensure_success(response)?.json().await?;
    Ok(payload_from(found))
}

/// One entry per distinct threat type, in the order reported.
fn payload_from(found: FindResponse) -> SourcePayload {
    let mut entries: Vec<String> = Vec::new();
    for m in found.matches {
        if !entries.contains(&m.threat_type) {
            entries.push(m.threat_type);
        }
    }
    SourcePayload::Matches { entries }
}
