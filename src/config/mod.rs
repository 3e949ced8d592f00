pub mod cli;

use crate::core::fetcher::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::core::ConfigProvider;
use crate::domain::rules::ExtractionRules;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_required_field, validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = "snyk_meta.json";
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const USAGE: &str = "Usage: advisor-meta <manifest-path> [output-path]";

#[derive(Debug, Clone, Parser)]
#[command(name = "advisor-meta")]
#[command(about = "Collect Snyk Advisor health scores for the packages in a requirements file")]
pub struct CliConfig {
    /// Dependency manifest, one requirement per line
    pub manifest: Option<String>,

    /// Where to write the ranked JSON
    #[arg(default_value = DEFAULT_OUTPUT_PATH)]
    pub output: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Pause after every request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// TOML file replacing the built-in extraction rules
    #[arg(long)]
    pub rules: Option<String>,

    /// Keep packages that failed to fetch, with an `error` field
    #[arg(long)]
    pub include_failed: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(skip)]
    pub extraction_rules: ExtractionRules,
}

impl CliConfig {
    /// Replaces the default rule table with the `--rules` file, if one was given.
    pub fn load_rules(&mut self) -> Result<()> {
        if let Some(path) = &self.rules {
            tracing::info!("📁 Loading extraction rules from: {}", path);
            self.extraction_rules = ExtractionRules::from_file(path)?;
        }
        Ok(())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let manifest = validate_required_field("manifest", &self.manifest)?;
        validate_path("manifest", manifest)?;
        validate_path("output", &self.output)?;
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        self.extraction_rules.validate()
    }
}

impl ConfigProvider for CliConfig {
    fn manifest_path(&self) -> &str {
        self.manifest.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn include_failed(&self) -> bool {
        self.include_failed
    }

    fn extraction_rules(&self) -> &ExtractionRules {
        &self.extraction_rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    #[test]
    fn test_single_argument_uses_default_output() {
        let config = CliConfig::try_parse_from(["advisor-meta", "requirements.txt"]).unwrap();
        assert_eq!(config.manifest_path(), "requirements.txt");
        assert_eq!(config.output_path(), "snyk_meta.json");
        assert_eq!(config.request_delay(), Duration::from_millis(500));
        assert_eq!(config.base_url(), "https://snyk.io/advisor/python");
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert!(!config.include_failed());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_second_argument_is_output() {
        let config =
            CliConfig::try_parse_from(["advisor-meta", "requirements.txt", "out/meta.json"])
                .unwrap();
        assert_eq!(config.output_path(), "out/meta.json");
    }

    #[test]
    fn test_missing_manifest_fails_validation() {
        let config = CliConfig::try_parse_from(["advisor-meta"]).unwrap();
        assert!(config.manifest.is_none());
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url_fails_validation() {
        let config = CliConfig::try_parse_from([
            "advisor-meta",
            "requirements.txt",
            "--base-url",
            "snyk.io/advisor",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_options() {
        let config = CliConfig::try_parse_from([
            "advisor-meta",
            "requirements.txt",
            "--delay-ms",
            "0",
            "--include-failed",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert!(config.include_failed());
        assert!(config.verbose);
    }

    #[test]
    fn test_load_rules_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "score = [\"b.score\"]\n").unwrap();

        let mut config = CliConfig::try_parse_from([
            "advisor-meta",
            "requirements.txt",
            "--rules",
            path.to_str().unwrap(),
        ])
        .unwrap();
        config.load_rules().unwrap();

        assert_eq!(config.extraction_rules().score, vec!["b.score".to_string()]);
    }
}
