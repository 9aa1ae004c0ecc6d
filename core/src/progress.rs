//! Player progress: unlockable log entries, achievements and statistics.

use crate::records::LogSaveData;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Logs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub log_id:       String,
    pub is_complete:  bool,
    pub is_read:      bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn new(log_id: impl Into<String>) -> Self {
        Self {
            log_id:       log_id.into(),
            is_complete:  false,
            is_read:      false,
            completed_at: None,
        }
    }

    fn record(&self) -> LogSaveData {
        LogSaveData {
            log_id:            self.log_id.clone(),
            is_complete:       self.is_complete,
            is_read:           self.is_read,
            time_completed_at: self.completed_at.map(|t| t.timestamp_millis()).unwrap_or(0),
        }
    }

    fn apply(&mut self, record: &LogSaveData) {
        self.is_complete = record.is_complete;
        self.is_read = record.is_read;
        self.completed_at = if record.is_complete {
            let at = Utc.timestamp_millis_opt(record.time_completed_at).single();
            if at.is_none() {
                log::debug!(
                    "log '{}' completion time {} is out of range, dropped",
                    self.log_id,
                    record.time_completed_at
                );
            }
            at
        } else {
            if record.time_completed_at != 0 {
                log::debug!(
                    "log '{}' is incomplete but carries completion time {}, dropped",
                    self.log_id,
                    record.time_completed_at
                );
            }
            None
        };
    }
}

/// The log computer's entries, in definition order.
#[derive(Debug, Default)]
pub struct LogBook {
    entries: Vec<LogEntry>,
    index:   HashMap<String, usize>,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an entry. Redefining an existing id keeps the original.
    pub fn define(&mut self, log_id: impl Into<String>) -> bool {
        let log_id = log_id.into();
        if self.index.contains_key(&log_id) {
            log::warn!("log '{log_id}' defined twice, keeping the first");
            return false;
        }
        self.index.insert(log_id.clone(), self.entries.len());
        self.entries.push(LogEntry::new(log_id));
        true
    }

    pub fn get(&self, log_id: &str) -> Option<&LogEntry> {
        self.index.get(log_id).map(|&i| &self.entries[i])
    }

    fn get_mut(&mut self, log_id: &str) -> Option<&mut LogEntry> {
        self.index.get(log_id).map(|&i| &mut self.entries[i])
    }

    /// Mark an entry complete at `at`. Completing twice keeps the first time.
    pub fn complete(&mut self, log_id: &str, at: DateTime<Utc>) -> bool {
        match self.get_mut(log_id) {
            Some(entry) if !entry.is_complete => {
                entry.is_complete = true;
                entry.completed_at = Some(at);
                true
            }
            _ => false,
        }
    }

    pub fn mark_read(&mut self, log_id: &str) -> bool {
        match self.get_mut(log_id) {
            Some(entry) if entry.is_complete && !entry.is_read => {
                entry.is_read = true;
                true
            }
            _ => false,
        }
    }

    pub fn records(&self) -> Vec<LogSaveData> {
        self.entries.iter().map(LogEntry::record).collect()
    }

    /// Apply loaded log records. Returns how many named no defined entry.
    pub fn load(&mut self, records: &[LogSaveData]) -> usize {
        let mut stale = 0;
        for record in records {
            match self.get_mut(&record.log_id) {
                Some(entry) => entry.apply(record),
                None => {
                    log::debug!("log record '{}' has no entry, dropped", record.log_id);
                    stale += 1;
                }
            }
        }
        stale
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_complete && !e.is_read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Achievements ───────────────────────────────────────────────────

/// Completed achievement ids, in completion order, without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementBook {
    completed: Vec<String>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&mut self, achievement_id: impl Into<String>) -> bool {
        let achievement_id = achievement_id.into();
        if self.is_completed(&achievement_id) {
            return false;
        }
        self.completed.push(achievement_id);
        true
    }

    pub fn is_completed(&self, achievement_id: &str) -> bool {
        self.completed.iter().any(|a| a == achievement_id)
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.clone()
    }

    /// Replace the completed set. Repeats in `ids` are collapsed.
    pub fn set_completed(&mut self, ids: &[String]) {
        self.completed.clear();
        for id in ids {
            self.complete(id.clone());
        }
    }
}

// ── Statistics ─────────────────────────────────────────────────────

/// Named player counters, stored as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerStats {
    values: BTreeMap<String, f64>,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: &str) -> f64 {
        self.values.get(stat).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: impl Into<String>, value: f64) {
        self.values.insert(stat.into(), value);
    }

    pub fn increment(&mut self, stat: &str, by: f64) -> f64 {
        let value = self.values.entry(stat.to_string()).or_insert(0.0);
        *value += by;
        *value
    }

    /// Replace every counter with the loaded ones.
    pub fn load_save_data(&mut self, saved: &PlayerStats) {
        self.values = saved.values.clone();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(stat, value)| (stat.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_completion_time_survives_a_record_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        let mut book = LogBook::new();
        book.define("log-intro");
        book.complete("log-intro", at);

        let records = book.records();
        assert_eq!(records[0].time_completed_at, at.timestamp_millis());

        let mut fresh = LogBook::new();
        fresh.define("log-intro");
        assert_eq!(fresh.load(&records), 0);
        assert_eq!(fresh.get("log-intro").unwrap().completed_at, Some(at));
    }

    #[test]
    fn incomplete_log_stores_zero_time() {
        let mut book = LogBook::new();
        book.define("log-locked");
        assert_eq!(book.records()[0].time_completed_at, 0);
        assert!(!book.mark_read("log-locked"), "cannot read an incomplete log");
    }

    #[test]
    fn unusable_completion_times_are_dropped() {
        let mut book = LogBook::new();
        book.define("log-intro");
        book.define("log-reactor");

        let stale = book.load(&[
            LogSaveData {
                log_id:            "log-intro".into(),
                is_complete:       false,
                is_read:           false,
                time_completed_at: 1_700_000_000_000,
            },
            LogSaveData {
                log_id:            "log-reactor".into(),
                is_complete:       true,
                is_read:           false,
                time_completed_at: i64::MAX,
            },
        ]);

        assert_eq!(stale, 0);
        assert_eq!(book.get("log-intro").unwrap().completed_at, None);
        let reactor = book.get("log-reactor").unwrap();
        assert!(reactor.is_complete);
        assert_eq!(reactor.completed_at, None);
        assert!(book.records().iter().all(|r| r.time_completed_at == 0));
    }

    #[test]
    fn achievements_collapse_repeats() {
        let mut book = AchievementBook::new();
        book.set_completed(&["a".into(), "b".into(), "a".into()]);
        assert_eq!(book.completed(), vec!["a".to_string(), "b".to_string()]);
    }
}
