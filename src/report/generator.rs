//! Markdown and JSON report generation.
//!
//! This module renders scan reports and history listings.

use crate::analysis::history::{average_intensity, mood_distribution};
use crate::analysis::{dominant_counts, overall_intensity};
use crate::config::ReportConfig;
use crate::models::{HistoryEntry, Mood, Resource, SampleResult, ScanMetadata, ScanReport};
use anyhow::Result;

/// Generate a complete Markdown scan report.
pub fn generate_markdown_report(
    report: &ScanReport,
    samples: &[SampleResult],
    options: &ReportConfig,
) -> String {
    let mut output = String::new();

    output.push_str("# Mood Scan Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_intensity_section(report));

    if options.include_tips {
        output.push_str(&generate_tips_section(&report.tips));
    }

    if options.include_resources {
        output.push_str(&generate_resources_section(
            &report.reference,
            &report.resources,
        ));
    }

    if options.include_samples {
        output.push_str(&generate_samples_section(samples));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ScanMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Server:** {}\n", metadata.server_url));
    section.push_str(&format!(
        "- **Scan Date:** {}\n",
        metadata.scan_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Schedule:** {} rounds over {}s, every {}s\n",
        metadata.rounds_planned, metadata.duration_seconds, metadata.interval_seconds
    ));
    section.push_str(&format!(
        "- **Rounds Sampled:** {}\n",
        metadata.rounds_succeeded
    ));
    if metadata.rounds_failed > 0 {
        section.push_str(&format!("- **Rounds Dropped:** {}\n", metadata.rounds_failed));
    }
    section.push_str(&format!(
        "- **Scan Duration:** {:.1}s\n",
        metadata.elapsed_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(report: &ScanReport) -> String {
    let mut section = String::new();
    let summary = &report.summary;

    section.push_str("## Summary\n\n");

    match summary.most_frequent_emotion {
        Some(ref label) => {
            let emoji = summary.mood().map(|m| m.emoji()).unwrap_or("❔");
            section.push_str(&format!(
                "**Most frequent mood:** {} {} ({} of {})\n\n",
                emoji, label, summary.occurrence_count, report.metadata.rounds_planned
            ));
            section.push_str(&format!("> **What you can do:** {}\n\n", summary.advice));
        }
        None => {
            section.push_str("No mood could be detected during this scan.\n\n");
        }
    }

    section
}

/// Generate the average intensity table.
fn generate_intensity_section(report: &ScanReport) -> String {
    let averages = &report.summary.average_intensities;
    if averages.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("### Average Emotion Intensities\n\n");
    section.push_str("| Emotion | Intensity |\n");
    section.push_str("|:---|:---:|\n");

    let mut rows: Vec<_> = averages.iter().collect();
    rows.sort_by_key(|(_, value)| std::cmp::Reverse(**value));

    for (label, value) in rows {
        section.push_str(&format!("| {} | {}% |\n", label, value));
    }
    section.push_str(&format!(
        "\n*Overall intensity: {}%*\n\n",
        overall_intensity(averages)
    ));

    section
}

fn generate_tips_section(tips: &[String]) -> String {
    if tips.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Tips\n\n");
    for tip in tips {
        section.push_str(&format!("- {}\n", tip));
    }
    section.push('\n');

    section
}

fn generate_resources_section(reference: &Resource, resources: &[Resource]) -> String {
    let mut section = String::new();

    section.push_str("## Resources\n\n");
    section.push_str(&format!(
        "**Reference:** [{}]({})\n\n",
        reference.title, reference.url
    ));
    for resource in resources {
        section.push_str(&format!("- [{}]({})\n", resource.title, resource.url));
    }
    section.push('\n');

    section
}

/// Generate the per-round sample table.
fn generate_samples_section(samples: &[SampleResult]) -> String {
    let mut section = String::new();

    section.push_str("## Samples\n\n");

    if samples.is_empty() {
        section.push_str("No samples were collected.\n\n");
        return section;
    }

    section.push_str("| # | Dominant | Score |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, sample) in samples.iter().enumerate() {
        let dominant = sample.dominant_emotion.as_deref().unwrap_or("-");
        let score = sample
            .dominant_emotion
            .as_ref()
            .and_then(|label| sample.emotions.get(label))
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!("| {} | {} | {} |\n", i + 1, dominant, score));
    }
    section.push('\n');

    let counts = dominant_counts(samples);
    if !counts.is_empty() {
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        let line: Vec<String> = counts
            .iter()
            .map(|(label, count)| format!("{} x{}", label, count))
            .collect();
        section.push_str(&format!("*Dominant counts: {}*\n\n", line.join(", ")));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by moodscan. Not a medical assessment.*\n");

    footer
}

/// Generate a JSON scan report.
pub fn generate_json_report(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a Markdown listing of saved summaries.
pub fn generate_history_markdown(entries: &[HistoryEntry], title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", title));

    if entries.is_empty() {
        output.push_str("No mood data for this selection.\n");
        return output;
    }

    output.push_str("| Time | User | Mood | Intensity | Note |\n");
    output.push_str("|:---|:---|:---|:---:|:---|\n");
    for entry in entries {
        let time = entry
            .recorded_at()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.clone());
        let mood = match Mood::from_label(&entry.dominant) {
            Some(m) => format!("{} {}", m.emoji(), entry.dominant),
            None => entry.dominant.clone(),
        };
        output.push_str(&format!(
            "| {} | {} | {} | {}% | {} |\n",
            time,
            escape_cell(&entry.username),
            escape_cell(&mood),
            entry.intensity,
            escape_cell(entry.note.as_deref().unwrap_or(""))
        ));
    }
    output.push('\n');

    let mut dist: Vec<_> = mood_distribution(entries).into_iter().collect();
    dist.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    output.push_str("## Mood Distribution\n\n");
    output.push_str("| Mood | Scans |\n");
    output.push_str("|:---|:---:|\n");
    for (mood, count) in dist {
        output.push_str(&format!("| {} | {} |\n", mood, count));
    }

    if let Some(avg) = average_intensity(entries) {
        output.push_str(&format!("\n*Average intensity: {:.1}%*\n", avg));
    }

    output
}

/// Make free text safe for a single Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}

/// Generate a JSON listing of saved summaries.
pub fn generate_history_json(entries: &[HistoryEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(Into::into)
}
