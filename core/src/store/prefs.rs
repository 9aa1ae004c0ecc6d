//! Per-slot preferences (SQLite).
//!
//! Holds what the menus read without opening a save document,
//! currently the "last saved at" time of each slot.

use crate::error::SaveResult;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const LAST_SAVE_KEY: &str = "last_save";

pub struct PrefsStore {
    conn: Connection,
}

impl PrefsStore {
    /// Open (or create) the preference database at `path`.
    pub fn open(path: impl AsRef<Path>) -> SaveResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and by hosts without a disk).
    pub fn in_memory() -> SaveResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SaveResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_prefs.sql"))?;
        Ok(())
    }

    // ── Last save ──────────────────────────────────────────────

    pub fn set_last_save(&self, slot: &str, at: DateTime<Utc>) -> SaveResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO slot_pref (slot, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![slot, LAST_SAVE_KEY, at.timestamp_millis().to_string(), at.timestamp()],
        )?;
        Ok(())
    }

    /// When `slot` was last saved, if ever. A value that no longer parses
    /// reads as "never".
    pub fn last_save(&self, slot: &str) -> SaveResult<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM slot_pref WHERE slot = ?1 AND key = ?2",
                params![slot, LAST_SAVE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()))
    }

    pub fn clear_last_save(&self, slot: &str) -> SaveResult<()> {
        self.conn.execute(
            "DELETE FROM slot_pref WHERE slot = ?1 AND key = ?2",
            params![slot, LAST_SAVE_KEY],
        )?;
        Ok(())
    }

    /// Number of slots with a recorded save time (for tests).
    pub fn saved_slot_count(&self) -> SaveResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM slot_pref WHERE key = ?1",
            params![LAST_SAVE_KEY],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Menu rendering of a last-save time: "14:30, March 9", or "..." if never.
pub fn format_last_save(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(t) => t.format("%H:%M, %B %-d").to_string(),
        None => "...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> PrefsStore {
        let prefs = PrefsStore::in_memory().expect("in-memory prefs");
        prefs.migrate().expect("migration");
        prefs
    }

    #[test]
    fn last_save_round_trips_to_the_millisecond() {
        let prefs = prefs();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap()
            + chrono::Duration::milliseconds(250);

        prefs.set_last_save("save", at).unwrap();
        assert_eq!(prefs.last_save("save").unwrap(), Some(at));
        assert_eq!(prefs.last_save("other").unwrap(), None);
    }

    #[test]
    fn clearing_forgets_only_that_slot() {
        let prefs = prefs();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        prefs.set_last_save("a", at).unwrap();
        prefs.set_last_save("b", at).unwrap();

        prefs.clear_last_save("a").unwrap();

        assert_eq!(prefs.last_save("a").unwrap(), None);
        assert_eq!(prefs.last_save("b").unwrap(), Some(at));
        assert_eq!(prefs.saved_slot_count().unwrap(), 1);
    }

    #[test]
    fn formats_like_the_menu() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        assert_eq!(format_last_save(Some(at)), "14:30, March 9");
        assert_eq!(format_last_save(None), "...");
    }
}
