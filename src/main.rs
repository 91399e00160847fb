//! moodscan - webcam mood scans from the command line
//!
//! Sends frames to a mood-detection backend on a fixed schedule,
//! reduces the per-frame results into a summary with advice, and
//! optionally saves it or browses previously saved summaries.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, missing frames, etc.)
//!   2 - Fewer valid samples than --min-samples

mod analysis;
mod cli;
mod client;
mod config;
mod frames;
mod models;
mod report;
mod session;

use analysis::advice::{reference_for, resources_for, tips_for};
use analysis::history::{filter_by_date, filter_by_user, sort_chronologically};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use client::{ClientConfig, HistoryQuery, MoodApiClient};
use config::{Config, CONFIG_FILE_NAME};
use frames::{discover_frames, DirectoryFrameSource, FrameConfig};
use models::{SaveRecord, ScanMetadata, ScanReport};
use session::{NoopObserver, ProgressObserver, ScanController, ScanObserver, ScanPlan};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the config file can raise the level
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("moodscan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let result = if args.is_scan() {
        run_mood_scan(&args, &config).await
    } else if let Some(id) = args.delete_entry {
        run_delete(&config, id).await
    } else {
        run_history(&args, &config).await
    };

    match result {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("moodscan failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .moodscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the server, scan schedule, frames, and report options.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over the verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = config.log_level(args.quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run a scan, write the report, and optionally save the summary.
/// Returns the exit code (0 or 2).
async fn run_mood_scan(args: &Args, config: &Config) -> Result<i32> {
    let plan = ScanPlan::new(config.scan.duration_seconds, config.scan.interval_seconds);
    let frame_root = frame_root(config)?;
    let frame_config = FrameConfig::from(&config.scan);

    if args.dry_run {
        return handle_dry_run(&plan, &frame_root, &frame_config);
    }

    let client = build_client(config)?;
    let mut frames = DirectoryFrameSource::open(&frame_root, &frame_config)?;

    println!("📷 Starting mood scan...");
    println!("   Server: {}", client.base_url());
    println!(
        "   Frames: {} ({} files)",
        frame_root.display(),
        frames.files().len()
    );
    println!(
        "   Schedule: {} rounds, every {}s",
        plan.sample_count, plan.interval_seconds
    );

    if plan.sample_count == 0 {
        warn!(
            "Duration {}s with interval {}s schedules no rounds",
            plan.duration_seconds, plan.interval_seconds
        );
    }

    let mut observer: Box<dyn ScanObserver> = if args.quiet {
        Box::new(NoopObserver)
    } else {
        Box::new(ProgressObserver::new())
    };

    let controller = ScanController::new();
    controller
        .run(&plan, &mut frames, &client, observer.as_mut())
        .await?;
    let outcome = controller
        .last_outcome()
        .context("Scan finished without an outcome")?;

    let summary = outcome.summary.clone();
    let mood = summary.mood();

    let report = ScanReport {
        metadata: ScanMetadata {
            server_url: client.base_url().to_string(),
            scan_date: Utc::now(),
            duration_seconds: plan.duration_seconds,
            interval_seconds: plan.interval_seconds,
            rounds_planned: plan.sample_count,
            rounds_succeeded: outcome.rounds_succeeded(),
            rounds_failed: outcome.rounds_failed,
            elapsed_seconds: outcome.elapsed.as_secs_f64(),
        },
        tips: tips_for(mood, summary.dominant_intensity() as f64),
        reference: reference_for(mood),
        resources: resources_for(mood),
        summary,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &outcome.samples, &config.report)
        }
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Scan Summary:");
    if report.summary.is_empty() {
        println!("   No mood detected.");
    } else {
        let label = report.summary.most_frequent_emotion.as_deref().unwrap_or_default();
        let emoji = mood.map(|m| m.emoji()).unwrap_or("❔");
        println!(
            "   Most frequent mood: {} {} ({} of {})",
            emoji, label, report.summary.occurrence_count, plan.sample_count
        );
        println!("   💡 {}", report.summary.advice);
    }
    println!(
        "   Rounds: {} sampled | {} dropped",
        outcome.rounds_succeeded(),
        outcome.rounds_failed
    );
    println!("   Duration: {:.1}s", outcome.elapsed.as_secs_f64());
    println!("\n✅ Report saved to: {}", output_path.display());

    if args.save {
        save_summary(&client, &report, args).await?;
    }

    if let Some(min_samples) = args.min_samples {
        let valid = outcome.valid_samples();
        if valid < min_samples {
            eprintln!(
                "\n⛔ Only {} of the required {} samples detected a mood. Failing (exit code 2).",
                valid, min_samples
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Persist the summary via the backend's save endpoint.
async fn save_summary(client: &MoodApiClient, report: &ScanReport, args: &Args) -> Result<()> {
    let Some(record) =
        SaveRecord::from_summary(&report.summary, args.name.clone(), args.note.clone())
    else {
        warn!("Scan produced no dominant mood; nothing to save");
        println!("⚠️  Nothing to save: no mood was detected.");
        return Ok(());
    };

    let saved = client
        .save_result(&record)
        .await
        .context("Failed to save scan summary")?;

    match saved.id {
        Some(id) => println!("💾 Saved scan summary (entry #{}).", id),
        None => println!("💾 Saved scan summary."),
    }
    Ok(())
}

/// Handle --dry-run: show the schedule and frames without contacting the server.
fn handle_dry_run(plan: &ScanPlan, frame_root: &Path, frame_config: &FrameConfig) -> Result<i32> {
    println!("\n🔍 Dry run: planning scan (no server calls)...\n");

    println!(
        "   Schedule: {} rounds over {}s, every {}s ({:.1}s of waiting)",
        plan.sample_count,
        plan.duration_seconds,
        plan.interval_seconds,
        plan.total_wait().as_secs_f64()
    );

    let files = discover_frames(frame_root, frame_config)?;

    if files.is_empty() {
        println!("   No matching frame files found.");
    } else {
        println!("   Found {} frames that would be sent:\n", files.len());
        for file in &files {
            println!("     🖼️  {} ({} bytes)", file.path.display(), file.size);
        }
        println!("\n   Total: {} frames", files.len());
    }

    println!("\n✅ Dry run complete. No frames were sent.");
    Ok(0)
}

/// Handle --history: list saved summaries.
async fn run_history(args: &Args, config: &Config) -> Result<i32> {
    let client = build_client(config)?;

    let query = HistoryQuery {
        limit: args.limit,
        date: args.date,
    };
    let mut entries = client
        .history(&query)
        .await
        .context("Failed to fetch mood history")?;
    info!("Fetched {} history entries", entries.len());

    // The date is applied locally as well since not every backend honors it.
    if let Some(date) = args.date {
        entries = filter_by_date(&entries, date);
    }
    if let Some(ref user) = args.user {
        entries = filter_by_user(&entries, user);
    }
    sort_chronologically(&mut entries);

    let title = match args.date {
        Some(date) => format!("Mood History for {}", date.format("%Y-%m-%d")),
        None => "Mood History".to_string(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_history_json(&entries)?,
        OutputFormat::Markdown => report::generate_history_markdown(&entries, &title),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write history to {}", path.display()))?;
            println!("✅ {} entries saved to: {}", entries.len(), path.display());
        }
        None => println!("{}", output),
    }

    Ok(0)
}

/// Handle --delete-entry: remove one saved summary.
async fn run_delete(config: &Config, id: i64) -> Result<i32> {
    let client = build_client(config)?;

    client
        .delete_entry(id)
        .await
        .with_context(|| format!("Failed to delete entry #{}", id))?;

    println!("🗑️  Deleted entry #{}.", id);
    Ok(0)
}

fn build_client(config: &Config) -> Result<MoodApiClient> {
    MoodApiClient::new(ClientConfig {
        base_url: config.server.url.clone(),
        timeout_seconds: config.server.timeout_seconds,
        token: config.server.token.clone(),
    })
}

fn frame_root(config: &Config) -> Result<PathBuf> {
    config
        .scan
        .frames
        .as_ref()
        .map(PathBuf::from)
        .context("No frame source: pass --frames or set `frames` under [scan]")
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}
