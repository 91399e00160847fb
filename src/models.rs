//! Data models for mood scans.
//!
//! This module contains the core data structures used throughout
//! the application for representing samples, summaries, saved records,
//! and reports.

use crate::analysis::overall_intensity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the emotion categories the backend classifier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Surprise,
    Fear,
    Disgust,
    Neutral,
}

impl Mood {
    /// All recognized moods, in the order the classifier reports them.
    #[cfg(test)]
    pub const ALL: [Mood; 7] = [
        Mood::Angry,
        Mood::Disgust,
        Mood::Fear,
        Mood::Happy,
        Mood::Sad,
        Mood::Surprise,
        Mood::Neutral,
    ];

    /// Parse a classifier label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Mood> {
        match label.trim().to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "angry" => Some(Mood::Angry),
            "surprise" => Some(Mood::Surprise),
            "fear" => Some(Mood::Fear),
            "disgust" => Some(Mood::Disgust),
            "neutral" => Some(Mood::Neutral),
            _ => None,
        }
    }

    /// Returns an emoji representation of the mood.
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Surprise => "😮",
            Mood::Fear => "😨",
            Mood::Disgust => "🤢",
            Mood::Neutral => "😐",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Happy => write!(f, "happy"),
            Mood::Sad => write!(f, "sad"),
            Mood::Angry => write!(f, "angry"),
            Mood::Surprise => write!(f, "surprise"),
            Mood::Fear => write!(f, "fear"),
            Mood::Disgust => write!(f, "disgust"),
            Mood::Neutral => write!(f, "neutral"),
        }
    }
}

/// One classifier response for a single captured frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    /// Top prediction for the frame, `None` when classification failed.
    pub dominant_emotion: Option<String>,
    /// Intensity (0-100) per recognized emotion label.
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
}

impl SampleResult {
    /// Builds a sample, discarding scores when no dominant emotion is present.
    pub fn new(dominant_emotion: Option<String>, emotions: BTreeMap<String, f64>) -> Self {
        let dominant_emotion = dominant_emotion.filter(|label| !label.trim().is_empty());
        let emotions = if dominant_emotion.is_some() {
            emotions
        } else {
            BTreeMap::new()
        };

        Self {
            dominant_emotion,
            emotions,
        }
    }

    /// Whether this sample takes part in aggregation.
    pub fn is_valid(&self) -> bool {
        self.dominant_emotion
            .as_deref()
            .is_some_and(|label| !label.trim().is_empty())
    }
}

/// Reduction of all samples collected during one scan session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Label seen most often as the dominant emotion.
    pub most_frequent_emotion: Option<String>,
    /// How many valid samples had that label as dominant emotion.
    pub occurrence_count: usize,
    /// Mean intensity per label over all valid samples, rounded.
    pub average_intensities: BTreeMap<String, i64>,
    /// Static recommendation chosen by the most frequent emotion.
    pub advice: String,
}

impl ScanSummary {
    /// The most frequent emotion as a recognized mood, if it is one.
    pub fn mood(&self) -> Option<Mood> {
        self.most_frequent_emotion
            .as_deref()
            .and_then(Mood::from_label)
    }

    /// Whether the scan produced no dominant emotion at all.
    pub fn is_empty(&self) -> bool {
        self.most_frequent_emotion.is_none()
    }

    /// Average intensity of the most frequent emotion, 0 when unknown.
    pub fn dominant_intensity(&self) -> i64 {
        self.most_frequent_emotion
            .as_ref()
            .and_then(|label| self.average_intensities.get(label))
            .copied()
            .unwrap_or(0)
    }
}

/// Record accepted by the backend's save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub dominant_emotion: String,
    /// Rounded mean over all average intensities.
    pub intensity: i64,
    pub emotions: BTreeMap<String, i64>,
    pub name: Option<String>,
    pub note: Option<String>,
}

impl SaveRecord {
    /// Builds a record from a summary. Returns `None` when the summary has
    /// no dominant emotion, since the backend rejects such records.
    pub fn from_summary(
        summary: &ScanSummary,
        name: Option<String>,
        note: Option<String>,
    ) -> Option<Self> {
        let dominant_emotion = summary.most_frequent_emotion.clone()?;

        Some(Self {
            dominant_emotion,
            intensity: overall_intensity(&summary.average_intensities),
            emotions: summary.average_intensities.clone(),
            name: name.filter(|n| !n.trim().is_empty()),
            note: note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// A previously saved summary as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: String,
    pub dominant: String,
    pub intensity: f64,
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "Anonymous".to_string()
}

impl HistoryEntry {
    /// Parses the entry timestamp as UTC.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// A titled external link shown alongside a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

impl Resource {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Metadata about a scan session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Base URL of the mood backend.
    pub server_url: String,
    /// When the scan finished.
    pub scan_date: DateTime<Utc>,
    /// Configured total scan duration in seconds.
    pub duration_seconds: f64,
    /// Configured pause between rounds in seconds.
    pub interval_seconds: f64,
    /// Number of rounds scheduled.
    pub rounds_planned: usize,
    /// Rounds that produced a sample.
    pub rounds_succeeded: usize,
    /// Rounds dropped because capture or analysis failed.
    pub rounds_failed: usize,
    /// Wall-clock duration of the scan in seconds.
    pub elapsed_seconds: f64,
}

/// The complete scan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Metadata about the scan.
    pub metadata: ScanMetadata,
    /// Aggregated summary.
    pub summary: ScanSummary,
    /// Intensity-banded tips for the most frequent mood.
    pub tips: Vec<String>,
    /// Primary reference link.
    pub reference: Resource,
    /// Further reading for the most frequent mood.
    pub resources: Vec<Resource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_with(averages: &[(&str, i64)], dominant: Option<&str>) -> ScanSummary {
        ScanSummary {
            most_frequent_emotion: dominant.map(String::from),
            occurrence_count: if dominant.is_some() { 1 } else { 0 },
            average_intensities: averages
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            advice: String::new(),
        }
    }

    #[test]
    fn test_mood_from_label() {
        assert_eq!(Mood::from_label("happy"), Some(Mood::Happy));
        assert_eq!(Mood::from_label("  SAD "), Some(Mood::Sad));
        assert_eq!(Mood::from_label("Surprise"), Some(Mood::Surprise));
        assert_eq!(Mood::from_label("contempt"), None);
        assert_eq!(Mood::from_label(""), None);
    }

    #[test]
    fn test_mood_display_round_trips_label() {
        for mood in Mood::ALL {
            assert_eq!(Mood::from_label(&mood.to_string()), Some(mood));
        }
    }

    #[test]
    fn test_sample_without_dominant_drops_scores() {
        let emotions: BTreeMap<String, f64> = [("happy".to_string(), 50.0)].into_iter().collect();

        let sample = SampleResult::new(None, emotions.clone());
        assert!(!sample.is_valid());
        assert!(sample.emotions.is_empty());

        let blank = SampleResult::new(Some("  ".to_string()), emotions.clone());
        assert!(!blank.is_valid());

        let valid = SampleResult::new(Some("happy".to_string()), emotions);
        assert!(valid.is_valid());
        assert_eq!(valid.emotions.len(), 1);
    }

    #[test]
    fn test_save_record_intensity_is_mean_of_averages() {
        let summary = summary_with(&[("happy", 47), ("sad", 40)], Some("happy"));
        let record = SaveRecord::from_summary(&summary, Some("ana".to_string()), None).unwrap();

        assert_eq!(record.dominant_emotion, "happy");
        assert_eq!(record.intensity, 44); // round(87 / 2) = round(43.5)
        assert_eq!(record.name.as_deref(), Some("ana"));
        assert_eq!(record.note, None);
    }

    #[test]
    fn test_save_record_requires_dominant() {
        let summary = summary_with(&[], None);
        assert!(SaveRecord::from_summary(&summary, None, None).is_none());
    }

    #[test]
    fn test_save_record_blank_fields_become_none() {
        let summary = summary_with(&[("fear", 10)], Some("fear"));
        let record =
            SaveRecord::from_summary(&summary, Some(" ".to_string()), Some("".to_string()))
                .unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.note, None);
        assert_eq!(record.intensity, 10);
    }

    #[test]
    fn test_dominant_intensity() {
        let summary = summary_with(&[("happy", 47), ("sad", 40)], Some("sad"));
        assert_eq!(summary.dominant_intensity(), 40);
        assert_eq!(summary_with(&[], None).dominant_intensity(), 0);
    }

    #[test]
    fn test_history_entry_defaults() {
        let json = r#"{"id": 3, "timestamp": "2025-10-23T21:00:00.123456Z", "dominant": "happy", "intensity": 42.0}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.username, "Anonymous");
        assert!(entry.emotions.is_empty());
        assert!(entry.recorded_at().is_some());
    }
}
