//! Markdown and JSON report generation.
//!
//! This module renders a link report: metadata, the verdict with its
//! reasons, and the per-rule and per-source breakdown behind it.

use crate::cli::OutputFormat;
use crate::models::{HeuristicResult, NormalizedSignal, Report, ReportMetadata, Verdict};
use anyhow::Result;

/// Render `report` in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# LinkGuard Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_verdict_section(&report.verdict));
    output.push_str(&generate_heuristics_section(&report.heuristics));
    output.push_str(&generate_sources_section(&report.signals));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **URL:** `{}`\n", metadata.url));
    if !metadata.host.is_empty() {
        section.push_str(&format!("- **Host:** `{}`\n", metadata.host));
    }
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Sources Queried:** {}\n",
        metadata.sources_queried
    ));
    if metadata.sources_unavailable > 0 {
        section.push_str(&format!(
            "- **Sources Unavailable:** {}\n",
            metadata.sources_unavailable
        ));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_verdict_section(verdict: &Verdict) -> String {
    let mut section = String::new();

    section.push_str("## Verdict\n\n");
    section.push_str(&format!(
        "{} **{}**\n\n",
        verdict.score.emoji(),
        verdict.score.to_string().to_uppercase()
    ));

    if verdict.reasons.is_empty() {
        section.push_str("No concerns found.\n\n");
    } else {
        for (i, reason) in verdict.reasons.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, reason));
        }
        section.push('\n');
    }

    section
}

fn generate_heuristics_section(heuristics: &[HeuristicResult]) -> String {
    let mut section = String::new();

    section.push_str("## Heuristics\n\n");
    section.push_str("| Rule | Result | Details |\n");
    section.push_str("|:---|:---:|:---|\n");
    for h in heuristics {
        let result = if h.matched { "✅ pass" } else { "❌ fail" };
        section.push_str(&format!("| {} | {} | {} |\n", h.rule, result, h.details));
    }
    section.push('\n');

    section
}

fn generate_sources_section(signals: &[NormalizedSignal]) -> String {
    let mut section = String::new();

    section.push_str("## External Sources\n\n");
    if signals.is_empty() {
        section.push_str("No external sources were queried.\n\n");
        return section;
    }

    section.push_str("| Source | Signal | Details |\n");
    section.push_str("|:---|:---:|:---|\n");
    for s in signals {
        section.push_str(&format!(
            "| {} | {} {} | {} |\n",
            s.source,
            s.verdict.emoji(),
            s.verdict,
            s.rationale
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by LinkGuard*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Score, SignalVerdict, SourceId};
    use chrono::Utc;

    fn create_test_report(verdict: Verdict) -> Report {
        Report {
            metadata: ReportMetadata {
                url: "http://login.example.com".to_string(),
                host: "login.example.com".to_string(),
                analysis_date: Utc::now(),
                sources_queried: 2,
                sources_unavailable: 1,
                duration_seconds: 1.25,
                tool_version: "0.3.0".to_string(),
            },
            heuristics: vec![
                HeuristicResult::fail("HTTPS", "URL does not use HTTPS"),
                HeuristicResult::pass("URL length", "URL length OK (24 characters)"),
            ],
            signals: vec![
                NormalizedSignal {
                    source: SourceId::VirusTotal,
                    verdict: SignalVerdict::Clean,
                    rationale: "Malicious: 0, Suspicious: 0 (of 90 engines)".to_string(),
                    raw_evidence_count: Some(0),
                    evidence_total: Some(90),
                },
                NormalizedSignal {
                    source: SourceId::AlienVaultOtx,
                    verdict: SignalVerdict::Unavailable,
                    rationale: "AlienVault OTX unavailable: lookup failed: HTTP 503".to_string(),
                    raw_evidence_count: None,
                    evidence_total: None,
                },
            ],
            verdict,
        }
    }

    fn suspect() -> Verdict {
        Verdict {
            score: Score::Suspect,
            reasons: vec![
                "URL does not use HTTPS".to_string(),
                "Sources unavailable: AlienVault OTX".to_string(),
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report(suspect()));

        assert!(markdown.contains("# LinkGuard Report"));
        assert!(markdown.contains("## Verdict"));
        assert!(markdown.contains("**SUSPECT**"));
        assert!(markdown.contains("1. URL does not use HTTPS"));
        assert!(markdown.contains("2. Sources unavailable: AlienVault OTX"));
        assert!(markdown.contains("| HTTPS | ❌ fail | URL does not use HTTPS |"));
        assert!(markdown.contains("| VirusTotal | 🟢 clean |"));
        assert!(markdown.contains("Sources Unavailable:** 1"));
    }

    #[test]
    fn test_safe_verdict_section() {
        let section = generate_verdict_section(&Verdict {
            score: Score::Safe,
            reasons: vec![],
        });
        assert!(section.contains("**SAFE**"));
        assert!(section.contains("No concerns found."));
    }

    #[test]
    fn test_no_sources_section() {
        let section = generate_sources_section(&[]);
        assert!(section.contains("No external sources were queried."));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report(suspect())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["verdict"]["score"], "suspect");
        assert_eq!(value["verdict"]["reasons"].as_array().map(|r| r.len()), Some(2));
        assert_eq!(value["signals"][1]["verdict"], "unavailable");
        assert_eq!(value["signals"][0]["source"], "virustotal");
        assert_eq!(value["metadata"]["host"], "login.example.com");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let report = create_test_report(suspect());
        assert!(render(&report, OutputFormat::Markdown)
            .unwrap()
            .starts_with("# LinkGuard Report"));
        assert!(render(&report, OutputFormat::Json).unwrap().starts_with('{'));
    }
}
