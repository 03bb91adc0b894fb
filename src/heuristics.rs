//! Local heuristic rules evaluated directly on the URL string.
//!
//! The rules never touch the network and never fail: a URL that cannot be
//! parsed simply yields an empty host, which the subdomain rule treats as
//! having no dots.

use crate::models::HeuristicResult;

/// Keywords commonly abused in phishing links.
pub const SUSPICIOUS_KEYWORDS: [&str; 6] = ["login", "secure", "account", "update", "free", "bank"];

/// Longest URL (in characters) still considered normal.
pub const MAX_URL_LENGTH: usize = 75;

/// Hosts with this many dots or more are considered over-nested.
pub const MAX_HOST_DOTS: usize = 3;

pub const RULE_HTTPS: &str = "HTTPS";
pub const RULE_LENGTH: &str = "URL length";
pub const RULE_SUBDOMAINS: &str = "Subdomain count";
pub const RULE_KEYWORDS: &str = "Suspicious keyword";

/// Run every rule against `url`, always returning results in the same order:
/// scheme, length, subdomain depth, keywords.
pub fn evaluate(url: &str) -> Vec<HeuristicResult> {
    let url = url.trim();
    vec![
        check_scheme(url),
        check_length(url),
        check_subdomains(url),
        check_keywords(url),
    ]
}

/// Extract the lower-cased host of `url`, or an empty string when there is none.
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url.trim())
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.trim_end_matches('.').to_lowercase()))
        .unwrap_or_default()
}

fn check_scheme(url: &str) -> HeuristicResult {
    if url.to_lowercase().starts_with("https://") {
        HeuristicResult::pass(RULE_HTTPS, "URL uses HTTPS")
    } else {
        HeuristicResult::fail(RULE_HTTPS, "URL does not use HTTPS")
    }
}

fn check_length(url: &str) -> HeuristicResult {
    let length = url.chars().count();
    if length <= MAX_URL_LENGTH {
        HeuristicResult::pass(RULE_LENGTH, format!("URL length OK ({} characters)", length))
    } else {
        HeuristicResult::fail(RULE_LENGTH, format!("URL very long ({} characters)", length))
    }
}

fn check_subdomains(url: &str) -> HeuristicResult {
    let host = extract_host(url);
    let dots = host.matches('.').count();
    if dots < MAX_HOST_DOTS {
        HeuristicResult::pass(RULE_SUBDOMAINS, format!("Subdomain count normal ({})", host))
    } else {
        HeuristicResult::fail(RULE_SUBDOMAINS, format!("Multiple subdomains in {}", host))
    }
}

fn check_keywords(url: &str) -> HeuristicResult {
    let lowered = url.to_lowercase();
    let found: Vec<&str> = SUSPICIOUS_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| lowered.contains(kw))
        .collect();

    if found.is_empty() {
        HeuristicResult::pass(RULE_KEYWORDS, "No suspicious keyword")
    } else {
        HeuristicResult::fail(
            RULE_KEYWORDS,
            format!("Suspicious keyword present: {}", found.join(", ")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(url: &str) -> Vec<bool> {
        evaluate(url).into_iter().map(|r| r.matched).collect()
    }

    #[test]
    fn test_clean_url_passes_everything() {
        assert_eq!(matched("https://example.com"), vec![true, true, true, true]);
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let rules: Vec<String> = evaluate("https://example.com")
            .into_iter()
            .map(|r| r.rule)
            .collect();
        assert_eq!(rules, vec![RULE_HTTPS, RULE_LENGTH, RULE_SUBDOMAINS, RULE_KEYWORDS]);
    }

    #[test]
    fn test_scheme_rule() {
        assert!(!evaluate("http://example.com")[0].matched);
        assert!(evaluate("HTTPS://example.com")[0].matched);
        assert!(!evaluate("ftp://example.com")[0].matched);
    }

    #[test]
    fn test_length_boundary_is_inclusive() {
        let base = "https://example.com/";
        let exactly_75 = format!("{}{}", base, "a".repeat(MAX_URL_LENGTH - base.len()));
        assert_eq!(exactly_75.len(), 75);
        assert!(evaluate(&exactly_75)[1].matched);

        let seventy_six = format!("{}a", exactly_75);
        let result = &evaluate(&seventy_six)[1];
        assert!(!result.matched);
        assert_eq!(result.details, "URL very long (76 characters)");
    }

    #[test]
    fn test_subdomain_depth() {
        assert!(evaluate("https://b.example.com")[2].matched);
        assert!(evaluate("https://www.example.co")[2].matched);

        let three_dots = &evaluate("https://a.b.example.com")[2];
        assert!(!three_dots.matched);
        assert_eq!(three_dots.details, "Multiple subdomains in a.b.example.com");

        let deep = &evaluate("https://a.b.c.example.com/x")[2];
        assert!(!deep.matched);
        assert_eq!(deep.details, "Multiple subdomains in a.b.c.example.com");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored_by_every_rule() {
        let padded = format!("  https://example.com/{}  ", "a".repeat(55));
        assert_eq!(padded.trim().len(), MAX_URL_LENGTH);
        assert_eq!(evaluate(&padded), evaluate(padded.trim()));
        assert_eq!(matched(&padded), vec![true, true, true, true]);
        assert_eq!(evaluate(&padded)[1].details, "URL length OK (75 characters)");
    }

    #[test]
    fn test_ip_host_counts_as_deep() {
        assert!(!evaluate("http://175.168.203.241:40796/i")[2].matched);
    }

    #[test]
    fn test_malformed_url_has_no_host_and_passes_depth() {
        assert_eq!(extract_host("not a url at all"), "");
        let results = evaluate("not.a.valid.url.at.all");
        assert!(results[2].matched);
        assert_eq!(results[2].details, "Subdomain count normal ()");
    }

    #[test]
    fn test_keywords_match_anywhere_case_insensitive() {
        let result = &evaluate("https://example.com/path/LOGIN?next=Bank")[3];
        assert!(!result.matched);
        assert_eq!(result.details, "Suspicious keyword present: login, bank");
        assert!(evaluate("https://example.com/docs")[3].matched);
    }

    #[test]
    fn test_phishing_style_url_fails_all_rules() {
        let url = "http://login.secure-bank.example.com/very/long/path/that/keeps/going/on/and/on/forever";
        let results = evaluate(url);
        assert!(results.iter().all(|r| !r.matched));
    }

    #[test]
    fn test_host_is_lowercased() {
        assert_eq!(extract_host("https://WWW.Example.COM/Path"), "www.example.com");
    }
}
