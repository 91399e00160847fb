//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.moodscan.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".moodscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Mood backend settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Scan schedule and frame settings.
    #[serde(default)]
    pub scan: ScanSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "mood_report.md".to_string()
}

/// Mood backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend.
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_seconds: default_timeout(),
            token: None,
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Scan schedule and frame discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Total scan duration in seconds.
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,

    /// Pause between rounds in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,

    /// Directory or file to read frames from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<String>,

    /// Image extensions treated as frames.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum frame size in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration(),
            interval_seconds: default_interval(),
            frames: None,
            extensions: default_extensions(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

fn default_duration() -> f64 {
    10.0
}

fn default_interval() -> f64 {
    1.0
}

fn default_extensions() -> Vec<String> {
    vec!["png", "jpg", "jpeg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_frame_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include intensity-banded tips.
    #[serde(default = "default_true")]
    pub include_tips: bool,

    /// Include further-reading links.
    #[serde(default = "default_true")]
    pub include_resources: bool,

    /// Include the per-round sample table.
    #[serde(default)]
    pub include_samples: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_tips: true,
            include_resources: true,
            include_samples: false,
        }
    }
}

fn default_true() -> bool {
    true
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

    /// Try to load `.moodscan.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref server) = args.server {
            self.server.url = server.clone();
        }
        if let Some(timeout) = args.timeout {
            self.server.timeout_seconds = timeout;
        }
        if let Some(ref token) = args.token {
            self.server.token = Some(token.clone());
        }

        if let Some(duration) = args.duration {
            self.scan.duration_seconds = duration;
        }
        if let Some(interval) = args.interval {
            self.scan.interval_seconds = interval;
        }
        if let Some(ref frames) = args.frames {
            self.scan.frames = Some(frames.to_string_lossy().to_string());
        }
        if let Some(ref extensions) = args.extensions {
            self.scan.extensions = extensions.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.to_string_lossy().to_string();
        }

        if args.show_samples {
            self.report.include_samples = true;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level for the merged settings. Quiet mode wins over verbose.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
