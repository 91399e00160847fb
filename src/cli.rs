//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// moodscan - webcam mood scans from the command line
///
/// Sends captured frames to a mood backend on a fixed schedule,
/// summarizes the detected emotions, and optionally saves the result.
///
/// Examples:
///   moodscan --frames ./captures
///   moodscan --frames ./captures --duration 20 --interval 2 --save --note "after lunch"
///   moodscan --history --date 2025-10-23
///   moodscan --frames ./captures --dry-run
///   moodscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Mood backend base URL
    #[arg(short, long, value_name = "URL", env = "MOODSCAN_SERVER")]
    pub server: Option<String>,

    /// Directory (or single image) to read frames from
    #[arg(short, long, value_name = "PATH")]
    pub frames: Option<PathBuf>,

    /// Total scan duration in seconds
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<f64>,

    /// Seconds between sampling rounds
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .moodscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Bearer token for the backend
    #[arg(long, value_name = "TOKEN", env = "MOODSCAN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Image extensions to treat as frames (comma-separated)
    ///
    /// Example: --extensions png,jpg
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Save the scan summary to the backend
    #[arg(long)]
    pub save: bool,

    /// Name stored with the saved summary
    #[arg(long, value_name = "NAME", requires = "save")]
    pub name: Option<String>,

    /// Note stored with the saved summary
    #[arg(long, value_name = "TEXT", requires = "save")]
    pub note: Option<String>,

    /// Include the per-round sample table in the report
    #[arg(long)]
    pub show_samples: bool,

    /// Fail unless at least this many rounds detected an emotion
    ///
    /// Exit code 2 when fewer valid samples were collected.
    #[arg(long, value_name = "COUNT")]
    pub min_samples: Option<usize>,

    /// List saved summaries instead of scanning
    #[arg(long, conflicts_with_all = ["save", "delete_entry", "dry_run"])]
    pub history: bool,

    /// Only list summaries saved on this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "history")]
    pub date: Option<NaiveDate>,

    /// Only list summaries saved under this name
    #[arg(long, value_name = "NAME", requires = "history")]
    pub user: Option<String>,

    /// Maximum number of summaries to fetch
    #[arg(long, default_value = "200", value_name = "COUNT")]
    pub limit: usize,

    /// Delete a saved summary by id
    #[arg(long, value_name = "ID", conflicts_with_all = ["save", "dry_run"])]
    pub delete_entry: Option<i64>,

    /// Dry run: list frames and the round schedule without contacting the server
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .moodscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref server) = self.server {
            if !server.starts_with("http://") && !server.starts_with("https://") {
                return Err("Server URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err("Duration must be a non-negative number of seconds".to_string());
            }
        }

        if let Some(interval) = self.interval {
            if !interval.is_finite() || interval <= 0.0 {
                return Err("Interval must be greater than 0 seconds".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.limit == 0 {
            return Err("Limit must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref frames) = self.frames {
            if !frames.exists() {
                return Err(format!("Frame path does not exist: {}", frames.display()));
            }
        }

        Ok(())
    }

    /// Whether this invocation runs a scan (as opposed to listing or deleting).
    pub fn is_scan(&self) -> bool {
        !self.history && self.delete_entry.is_none()
    }
}
