//! Terminal progress display for running scans.

use crate::session::scan_loop::{RoundOutcome, ScanObserver, ScanOutcome, ScanPlan};
use indicatif::{ProgressBar, ProgressStyle};

/// Shows a progress bar that advances once per round.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ProgressObserver {
    fn scan_started(&mut self, plan: &ScanPlan) {
        self.bar.set_length(plan.sample_count as u64);
        self.bar
            .set_message(format!("Scanning... 0/{}", plan.sample_count));
    }

    fn round_started(&mut self, round: usize, total: usize) {
        self.bar
            .set_message(format!("Scanning... {}/{}", round + 1, total));
    }

    fn round_finished(&mut self, round: usize, outcome: &RoundOutcome) {
        match outcome {
            RoundOutcome::Sampled {
                dominant_emotion: Some(label),
            } => self.bar.println(format!("   Round {}: {}", round + 1, label)),
            RoundOutcome::Sampled {
                dominant_emotion: None,
            } => self
                .bar
                .println(format!("   Round {}: no face detected", round + 1)),
            RoundOutcome::CaptureFailed(e) | RoundOutcome::AnalysisFailed(e) => self
                .bar
                .println(format!("   ⚠️  Round {} dropped: {}", round + 1, e)),
        }
        self.bar.inc(1);
    }

    fn scan_finished(&mut self, _outcome: &ScanOutcome) {
        self.bar.finish_with_message("Scan complete!");
    }
}
