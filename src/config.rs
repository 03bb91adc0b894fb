//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.linkguard.toml` files.

use crate::cli::OutputFormat;
use crate::models::SourceId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".linkguard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Threat-intelligence source settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// API credentials, one per source.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where to write the report (stdout summary only when unset).
    #[serde(default)]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: None,
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

/// Threat-intelligence source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Sources to query, in report order.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent sent with every lookup.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_enabled() -> Vec<String> {
    vec![
        SourceId::VirusTotal,
        SourceId::GoogleSafeBrowsing,
        SourceId::AlienVaultOtx,
    ]
    .into_iter()
    .map(|id| id.key().to_string())
    .collect()
}

fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("linkguard/{}", env!("CARGO_PKG_VERSION"))
}

/// API credentials. Empty strings count as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virustotal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_safe_browsing: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alienvault_otx: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlhaus: Option<String>,
}

impl CredentialsConfig {
    /// Credential configured for `source`, if any.
    pub fn get(&self, source: SourceId) -> Option<&str> {
        let value = match source {
            SourceId::VirusTotal => &self.virustotal,
            SourceId::GoogleSafeBrowsing => &self.google_safe_browsing,
            SourceId::AlienVaultOtx => &self.alienvault_otx,
            SourceId::UrlHaus => &self.urlhaus,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    fn slot(&mut self, source: SourceId) -> &mut Option<String> {
        match source {
            SourceId::VirusTotal => &mut self.virustotal,
            SourceId::GoogleSafeBrowsing => &mut self.google_safe_browsing,
            SourceId::AlienVaultOtx => &mut self.alienvault_otx,
            SourceId::UrlHaus => &mut self.urlhaus,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.linkguard.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref sources) = args.sources {
            self.sources.enabled = sources.clone();
        }
        if let Some(timeout) = args.timeout {
            self.sources.timeout_seconds = timeout;
        }

        // Credentials from flags or environment win over the file
        for source in SourceId::ALL {
            if let Some(key) = args.credential(source) {
                *self.credentials.slot(source) = Some(key.to_string());
            }
        }
    }

    /// Parse the enabled source list, dropping duplicates but keeping order.
    pub fn enabled_sources(&self) -> Result<Vec<SourceId>> {
        let mut sources = Vec::new();
        for name in &self.sources.enabled {
            let id: SourceId = name.parse().map_err(anyhow::Error::msg)?;
            if !sources.contains(&id) {
                sources.push(id);
            }
        }
        Ok(sources)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
