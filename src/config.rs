use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::report::normalize::{DEFAULT_EPIC_LINK_FIELD, DEFAULT_STORY_POINTS_FIELD, NormalizeContext};

/// Main configuration structure for Tracker Pulse
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerPulseConfig {
    /// Issue tracker connection
    pub tracker: TrackerConfig,
    /// Report generation defaults
    pub report: ReportConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Web dashboard settings
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Instance root, e.g. https://your-org.atlassian.net
    pub base_url: String,
    /// Account email for basic auth; bearer auth is used when absent
    pub email: Option<String>,
    /// API token (can be set via env var)
    pub token: Option<String>,
    /// Custom field holding the epic link key
    pub epic_link_field: String,
    /// Custom field holding story point estimates
    pub story_points_field: String,
    /// Upper bound on issues fetched per report
    pub max_results: usize,
    /// Issues requested per page
    pub page_size: usize,
    pub request_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Steady request rate
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Project used when none is given on the command line
    pub default_project: Option<String>,
    pub lookback_days: u32,
    /// Directory exported reports are written to
    pub output_dir: String,
    /// One of html, markdown, csv, json
    pub default_format: String,
    /// Directory searched for HTML templates before the built-in one
    pub template_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(), // Read from env var or tracker-pulse.toml
            email: None,
            token: None,
            epic_link_field: DEFAULT_EPIC_LINK_FIELD.to_string(),
            story_points_field: DEFAULT_STORY_POINTS_FIELD.to_string(),
            max_results: 100,
            page_size: 50,
            request_timeout_seconds: 30,
            cache_ttl_seconds: 300, // 5 minutes
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_project: None,
            lookback_days: 14,
            output_dir: "reports".to_string(),
            default_format: "html".to_string(),
            template_dir: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl TrackerConfig {
    /// Settings the normalizer needs to build links and read custom fields
    pub fn normalize_context(&self) -> NormalizeContext {
        NormalizeContext {
            base_url: self.base_url.clone(),
            epic_link_field: self.epic_link_field.clone(),
            story_points_field: self.story_points_field.clone(),
        }
    }
}

impl TrackerPulseConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (tracker-pulse.toml, .tracker-pulse-rc)
    /// 3. Environment variables (prefixed with TRACKER_PULSE_)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`load`](Self::load) but looks for files in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join("tracker-pulse.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".tracker-pulse-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        // Override with environment variables, e.g. TRACKER_PULSE_TRACKER__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix("TRACKER_PULSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut tracker_pulse_config: TrackerPulseConfig = builder.build()?.try_deserialize()?;
        tracker_pulse_config.apply_env_fallbacks(|name| std::env::var(name).ok());
        Ok(tracker_pulse_config)
    }

    /// Credentials and instance URL may also come from the conventional variables
    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let tracker = &mut self.tracker;
        if tracker.token.is_none() {
            tracker.token = lookup("JIRA_API_TOKEN").or_else(|| lookup("TRACKER_PULSE_TOKEN"));
        }
        if tracker.email.is_none() {
            tracker.email = lookup("JIRA_EMAIL");
        }
        if tracker.base_url.is_empty() {
            if let Some(url) = lookup("JIRA_BASE_URL") {
                tracker.base_url = url;
            }
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TrackerPulseConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = TrackerPulseConfig::load_env_file();
        TrackerPulseConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TrackerPulseConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TrackerPulseConfig::default();
        assert_eq!(config.tracker.max_results, 100);
        assert_eq!(config.tracker.epic_link_field, "customfield_10014");
        assert_eq!(config.report.lookback_days, 14);
        assert_eq!(config.report.default_format, "html");
        assert_eq!(config.dashboard.port, 8080);
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_load_from_toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tracker-pulse.toml"),
            r#"
[tracker]
base_url = "https://acme.atlassian.net"
max_results = 250

[report]
default_project = "APP"
lookback_days = 30
"#,
        )
        .unwrap();

        let config = TrackerPulseConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.tracker.base_url, "https://acme.atlassian.net");
        assert_eq!(config.tracker.max_results, 250);
        assert_eq!(config.tracker.page_size, 50);
        assert_eq!(config.report.default_project.as_deref(), Some("APP"));
        assert_eq!(config.report.lookback_days, 30);
        assert_eq!(config.dashboard.host, "127.0.0.1");
    }

    #[test]
    fn test_env_fallbacks_fill_missing_credentials_only() {
        let vars: HashMap<&str, &str> = [
            ("JIRA_API_TOKEN", "from-env"),
            ("JIRA_EMAIL", "dev@example.com"),
            ("JIRA_BASE_URL", "https://env.atlassian.net"),
        ]
        .into_iter()
        .collect();
        let lookup = |name: &str| vars.get(name).map(|v| v.to_string());

        let mut config = TrackerPulseConfig::default();
        config.apply_env_fallbacks(lookup);
        assert_eq!(config.tracker.token.as_deref(), Some("from-env"));
        assert_eq!(config.tracker.email.as_deref(), Some("dev@example.com"));
        assert_eq!(config.tracker.base_url, "https://env.atlassian.net");

        let mut config = TrackerPulseConfig::default();
        config.tracker.token = Some("from-file".to_string());
        config.tracker.base_url = "https://file.atlassian.net".to_string();
        config.apply_env_fallbacks(lookup);
        assert_eq!(config.tracker.token.as_deref(), Some("from-file"));
        assert_eq!(config.tracker.base_url, "https://file.atlassian.net");
    }

    #[test]
    fn test_secondary_token_variable() {
        let lookup = |name: &str| (name == "TRACKER_PULSE_TOKEN").then(|| "fallback".to_string());
        let mut config = TrackerPulseConfig::default();
        config.apply_env_fallbacks(lookup);
        assert_eq!(config.tracker.token.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_save_to_file_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TrackerPulseConfig::default();
        config.tracker.base_url = "https://saved.atlassian.net".to_string();
        config.dashboard.port = 9090;
        config.save_to_file(dir.path().join("tracker-pulse.toml")).unwrap();

        let loaded = TrackerPulseConfig::load_from(dir.path()).unwrap();
        assert_eq!(loaded.tracker.base_url, "https://saved.atlassian.net");
        assert_eq!(loaded.dashboard.port, 9090);
    }

    #[test]
    fn test_normalize_context_from_tracker_settings() {
        let mut tracker = TrackerConfig::default();
        tracker.base_url = "https://acme.atlassian.net".to_string();
        tracker.story_points_field = "customfield_20000".to_string();
        let ctx = tracker.normalize_context();
        assert_eq!(ctx.browse_url("APP-1"), "https://acme.atlassian.net/browse/APP-1");
        assert_eq!(ctx.story_points_field, "customfield_20000");
    }
}
