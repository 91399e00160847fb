//! Sample aggregation and statistics.
//!
//! This module reduces the samples collected during a scan session
//! into a single summary.

use crate::analysis::advice::advice_for;
use crate::models::{SampleResult, ScanSummary};
use std::collections::BTreeMap;

/// Reduce the samples of one scan session into a summary.
///
/// Samples without a dominant emotion are ignored. Averages divide each
/// label's running sum by the number of valid samples, so a label missing
/// from some frames is averaged as if it scored nothing there.
pub fn aggregate_results(results: &[SampleResult]) -> ScanSummary {
    let valid: Vec<&SampleResult> = results.iter().filter(|r| r.is_valid()).collect();
    let n = valid.len();

    // Counts keep first-seen order so ties resolve to the earliest label.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();

    for sample in &valid {
        if let Some(ref dominant) = sample.dominant_emotion {
            match counts.iter_mut().find(|(label, _)| *label == dominant.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((dominant.as_str(), 1)),
            }
        }

        for (label, value) in &sample.emotions {
            *sums.entry(label.as_str()).or_insert(0.0) += value;
        }
    }

    let mut top: Option<&str> = None;
    let mut top_count = 0;
    for (label, count) in &counts {
        if *count > top_count {
            top = Some(*label);
            top_count = *count;
        }
    }

    let average_intensities = if n == 0 {
        BTreeMap::new()
    } else {
        sums.into_iter()
            .map(|(label, sum)| (label.to_string(), (sum / n as f64).round() as i64))
            .collect()
    };

    ScanSummary {
        most_frequent_emotion: top.map(String::from),
        occurrence_count: top_count,
        average_intensities,
        advice: advice_for(top).to_string(),
    }
}

/// Count how often each label was the dominant emotion.
pub fn dominant_counts(results: &[SampleResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for dominant in results.iter().filter_map(|r| r.dominant_emotion.as_ref()) {
        *counts.entry(dominant.clone()).or_insert(0) += 1;
    }

    counts
}

/// Overall intensity of a set of averages: the rounded mean of its values.
pub fn overall_intensity(averages: &BTreeMap<String, i64>) -> i64 {
    let total: i64 = averages.values().sum();
    let count = averages.len().max(1) as f64;
    (total as f64 / count).round() as i64
}
