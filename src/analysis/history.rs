//! Client-side views over saved mood history.

use crate::models::HistoryEntry;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Keep entries recorded on the given UTC calendar date.
///
/// Entries whose timestamp cannot be parsed are dropped.
pub fn filter_by_date(entries: &[HistoryEntry], date: NaiveDate) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|e| e.recorded_at().map(|ts| ts.date_naive()) == Some(date))
        .cloned()
        .collect()
}

/// Keep entries saved under the given name (case-insensitive).
pub fn filter_by_user(entries: &[HistoryEntry], username: &str) -> Vec<HistoryEntry> {
    let wanted = username.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| e.username.to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Sort entries oldest to newest. Unparseable timestamps sort last.
pub fn sort_chronologically(entries: &mut [HistoryEntry]) {
    entries.sort_by_key(|e| (e.recorded_at().is_none(), e.recorded_at(), e.id));
}

/// Count entries per dominant mood.
pub fn mood_distribution(entries: &[HistoryEntry]) -> HashMap<String, usize> {
    let mut dist: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        *dist.entry(entry.dominant.to_lowercase()).or_default() += 1;
    }

    dist
}

/// Mean saved intensity across entries, `None` for an empty slice.
pub fn average_intensity(entries: &[HistoryEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }

    let total: f64 = entries.iter().map(|e| e.intensity).sum();
    Some(total / entries.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, timestamp: &str, dominant: &str, username: &str) -> HistoryEntry {
        HistoryEntry {
            id,
            timestamp: timestamp.to_string(),
            dominant: dominant.to_string(),
            intensity: 10.0 * id as f64,
            emotions: Default::default(),
            note: None,
            username: username.to_string(),
        }
    }

    fn sample_entries() -> Vec<HistoryEntry> {
        vec![
            entry(3, "2025-10-24T08:00:00Z", "sad", "ana"),
            entry(2, "2025-10-23T21:30:00.500000Z", "happy", "Anonymous"),
            entry(1, "2025-10-23T09:15:00Z", "Happy", "Ana"),
            entry(4, "not-a-date", "fear", "ana"),
        ]
    }

    #[test]
    fn test_filter_by_date() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 23).unwrap();
        let filtered = filter_by_date(&sample_entries(), date);

        let ids: Vec<i64> = filtered.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_filter_by_user_ignores_case() {
        let filtered = filter_by_user(&sample_entries(), "ANA");
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut entries = sample_entries();
        sort_chronologically(&mut entries);

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_mood_distribution() {
        let dist = mood_distribution(&sample_entries());
        assert_eq!(dist.get("happy"), Some(&2));
        assert_eq!(dist.get("sad"), Some(&1));
        assert_eq!(dist.get("fear"), Some(&1));
    }

    #[test]
    fn test_average_intensity() {
        assert_eq!(average_intensity(&[]), None);
        assert_eq!(average_intensity(&sample_entries()), Some(25.0));
    }
}
