//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Score, SourceId};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LinkGuard - explainable URL risk verdicts
///
/// Checks a link against local heuristics and external threat-intelligence
/// feeds, then explains why it is safe, suspect or malicious.
///
/// Examples:
///   linkguard --url https://example.com
///   linkguard --url http://login.example.net/verify --format json -o verdict.json
///   linkguard --url https://example.com --sources virustotal,urlhaus
///   linkguard --url https://example.com --fail-on suspect
///   linkguard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// URL to assess
    #[arg(short, long, value_name = "URL", required_unless_present = "init_config")]
    pub url: Option<String>,

    /// Write the full report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .linkguard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Sources to query (comma-separated)
    ///
    /// Example: --sources virustotal,google_safe_browsing,alienvault_otx,urlhaus
    #[arg(long, value_name = "SOURCES", value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Per-lookup timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// VirusTotal API key
    #[arg(long, value_name = "KEY", env = "VT_API_KEY", hide_env_values = true)]
    pub vt_api_key: Option<String>,

    /// Google Safe Browsing API key
    #[arg(long, value_name = "KEY", env = "GSB_API_KEY", hide_env_values = true)]
    pub gsb_api_key: Option<String>,

    /// AlienVault OTX API key
    #[arg(long, value_name = "KEY", env = "OTX_API_KEY", hide_env_values = true)]
    pub otx_api_key: Option<String>,

    /// URLhaus Auth-Key
    #[arg(long, value_name = "KEY", env = "URLHAUS_AUTH_KEY", hide_env_values = true)]
    pub urlhaus_auth_key: Option<String>,

    /// Fail if the verdict is at or above this level
    ///
    /// Useful in pipelines. Exit code 2 when the threshold is reached.
    /// Values: suspect, malicious
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Dry run: evaluate heuristics only, without querying any source
    ///
    /// Shows which sources would be queried and whether they have credentials.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .linkguard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Verdict level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Suspect,
    Malicious,
}

impl From<FailOnLevel> for Score {
    fn from(level: FailOnLevel) -> Self {
        match level {
            FailOnLevel::Suspect => Score::Suspect,
            FailOnLevel::Malicious => Score::Malicious,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The URL to assess (empty when not set; validate first).
    pub fn target_url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Credential passed on the command line or through the environment.
    pub fn credential(&self, source: SourceId) -> Option<&str> {
        let value = match source {
            SourceId::VirusTotal => &self.vt_api_key,
            SourceId::GoogleSafeBrowsing => &self.gsb_api_key,
            SourceId::AlienVaultOtx => &self.otx_api_key,
            SourceId::UrlHaus => &self.urlhaus_auth_key,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.target_url().trim().is_empty() {
            return Err("URL must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref sources) = self.sources {
            for name in sources {
                name.parse::<SourceId>()?;
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings. `config_verbose`
    /// is the `[general] verbose` value; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            url: Some("https://example.com".to_string()),
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            sources: None,
            timeout: None,
            vt_api_key: None,
            gsb_api_key: None,
            otx_api_key: None,
            urlhaus_auth_key: None,
            fail_on: None,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_malformed_url_is_accepted() {
        let mut args = make_args();
        args.url = Some("ceci_n_est_pas_une_url".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_url() {
        let mut args = make_args();
        args.url = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_unknown_source() {
        let mut args = make_args();
        args.sources = Some(vec!["virustotal".to_string(), "shodan".to_string()]);
        let err = args.validate().unwrap_err();
        assert!(err.contains("shodan"));
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let mut args = make_args();
        args.vt_api_key = Some("  ".to_string());
        args.otx_api_key = Some("otx".to_string());
        assert_eq!(args.credential(SourceId::VirusTotal), None);
        assert_eq!(args.credential(SourceId::AlienVaultOtx), Some("otx"));
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_fail_on_maps_to_score() {
        assert_eq!(Score::from(FailOnLevel::Suspect), Score::Suspect);
        assert_eq!(Score::from(FailOnLevel::Malicious), Score::Malicious);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "linkguard",
            "--url",
            "https://example.com",
            "--sources",
            "virustotal,urlhaus",
            "--fail-on",
            "suspect",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.target_url(), "https://example.com");
        assert_eq!(
            args.sources,
            Some(vec!["virustotal".to_string(), "urlhaus".to_string()])
        );
        assert_eq!(args.fail_on, Some(FailOnLevel::Suspect));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }
}
