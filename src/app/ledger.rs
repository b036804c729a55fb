// src/app/ledger.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app::types::{MovieSummary, PopularityRecord, TrendingList};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SQL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS search_counts (
  id          INTEGER PRIMARY KEY AUTOINCREMENT,
  search_term TEXT    NOT NULL UNIQUE,
  count       INTEGER NOT NULL DEFAULT 1,
  movie_id    INTEGER NOT NULL,
  title       TEXT    NOT NULL,
  poster_url  TEXT,
  created_at  INTEGER NOT NULL,
  updated_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_search_counts_rank
  ON search_counts (count DESC, updated_at DESC);
"#;

// The conflict branch only bumps the counter; the cached movie stays from the first search.
const SQL_UPSERT: &str = r#"
INSERT INTO search_counts (search_term, count, movie_id, title, poster_url, created_at, updated_at)
VALUES (?1, 1, ?2, ?3, ?4, ?5, ?5)
ON CONFLICT(search_term) DO UPDATE SET
  count = count + 1,
  updated_at = excluded.updated_at
"#;

const SQL_TOP: &str = r#"
SELECT id, search_term, count, movie_id, title, poster_url, updated_at
FROM search_counts
ORDER BY count DESC, updated_at DESC, id ASC
LIMIT ?1
"#;

const SQL_BY_TERM: &str = r#"
SELECT id, search_term, count, movie_id, title, poster_url, updated_at
FROM search_counts
WHERE search_term = ?1
"#;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Search popularity counters. Both operations absorb store failures.
pub trait PopularityLedger: Send + Sync {
    /// Count one satisfied search for `query`, caching `top_result` on first sight.
    fn record_search(&self, query: &str, top_result: &MovieSummary);

    /// Up to `limit` records, most searched first. Empty on failure.
    fn list_top_records(&self, limit: usize) -> TrendingList;
}

/// SQLite-backed ledger. Each call opens its own connection, so concurrent
/// writers from different threads rely on SQLite's locking for atomicity.
pub struct SqliteLedger {
    path: PathBuf,
    image_base_url: String,
    read_only: bool,
}

impl SqliteLedger {
    pub fn new(path: impl Into<PathBuf>, image_base_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image_base_url: image_base_url.into(),
            read_only: false,
        }
    }

    /// Inspection handle: never creates the file, its directory or the schema.
    pub fn open_read_only(path: impl Into<PathBuf>, image_base_url: impl Into<String>) -> Self {
        Self {
            read_only: true,
            ..Self::new(path, image_base_url)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, LedgerError> {
        if self.read_only {
            let conn = Connection::open_with_flags(
                &self.path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            return Ok(conn);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SQL_SCHEMA)?;
        Ok(conn)
    }

    pub fn try_record_search(
        &self,
        query: &str,
        top_result: &MovieSummary,
    ) -> Result<(), LedgerError> {
        let conn = self.connect()?;
        let now = Utc::now().timestamp_millis();
        let poster_url = top_result.poster_url(&self.image_base_url);
        conn.execute(
            SQL_UPSERT,
            params![query, top_result.id, top_result.title, poster_url, now],
        )?;
        Ok(())
    }

    pub fn try_list_top_records(&self, limit: usize) -> Result<TrendingList, LedgerError> {
        let conn = self.connect()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(SQL_TOP)?;
        let rows = stmt.query_map([limit], record_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn find(&self, search_term: &str) -> Result<Option<PopularityRecord>, LedgerError> {
        let conn = self.connect()?;
        let record = conn
            .query_row(SQL_BY_TERM, [search_term], record_from_row)
            .optional()?;
        Ok(record)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PopularityRecord> {
    let count: i64 = row.get("count")?;
    Ok(PopularityRecord {
        id: row.get("id")?,
        search_term: row.get("search_term")?,
        count: u64::try_from(count).unwrap_or_default(),
        movie_id: row.get("movie_id")?,
        title: row.get("title")?,
        poster_url: row.get("poster_url")?,
        updated_at: row.get("updated_at")?,
    })
}

impl PopularityLedger for SqliteLedger {
    fn record_search(&self, query: &str, top_result: &MovieSummary) {
        if query.trim().is_empty() {
            debug!("Skipping ledger write for empty query");
            return;
        }
        match self.try_record_search(query, top_result) {
            Ok(()) => debug!("Recorded search `{query}` (top: {})", top_result.title),
            Err(err) => warn!("Failed to record search `{query}`: {err}"),
        }
    }

    fn list_top_records(&self, limit: usize) -> TrendingList {
        match self.try_list_top_records(limit) {
            Ok(records) => records,
            Err(err) => {
                warn!("Failed to load trending searches: {err}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const IMG: &str = "https://image.tmdb.org/t/p/w500";

    fn movie(id: i64, title: &str, poster: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.into(),
            poster_path: Some(poster.into()),
            vote_average: None,
            release_date: None,
            original_language: None,
        }
    }

    fn ledger_in(dir: &tempfile::TempDir) -> SqliteLedger {
        SqliteLedger::new(dir.path().join("nested").join("popularity.db"), IMG)
    }

    #[test]
    fn first_search_creates_then_repeat_increments() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);

        ledger.record_search("dune", &movie(438631, "Dune", "/dune.jpg"));
        let rec = ledger.find("dune").unwrap().unwrap();
        assert_eq!(rec.count, 1);
        assert_eq!(rec.movie_id, 438631);
        assert_eq!(rec.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/dune.jpg"));

        ledger.record_search("dune", &movie(693134, "Dune: Part Two", "/part2.jpg"));
        let rec = ledger.find("dune").unwrap().unwrap();
        assert_eq!(rec.count, 2);
        assert_eq!(rec.title, "Dune");
        assert_eq!(rec.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/dune.jpg"));
    }

    #[test]
    fn keys_are_exact() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        ledger.record_search("Batman", &movie(1, "Batman", "/a.jpg"));
        ledger.record_search("batman", &movie(1, "Batman", "/a.jpg"));
        assert_eq!(ledger.find("Batman").unwrap().unwrap().count, 1);
        assert_eq!(ledger.find("batman").unwrap().unwrap().count, 1);
    }

    #[test]
    fn empty_query_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        ledger.record_search("  ", &movie(1, "Heat", "/h.jpg"));
        assert!(ledger.list_top_records(10).is_empty());
    }

    #[test]
    fn top_records_are_ranked_by_count() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        for _ in 0..3 {
            ledger.record_search("alien", &movie(348, "Alien", "/alien.jpg"));
        }
        ledger.record_search("heat", &movie(949, "Heat", "/heat.jpg"));
        for _ in 0..2 {
            ledger.record_search("dune", &movie(438631, "Dune", "/dune.jpg"));
        }

        let top = ledger.list_top_records(2);
        let terms: Vec<&str> = top.iter().map(|r| r.search_term.as_str()).collect();
        assert_eq!(terms, vec!["alien", "dune"]);
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn concurrent_writers_do_not_lose_increments() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(ledger_in(&dir));
        ledger.record_search("dune", &movie(438631, "Dune", "/dune.jpg"));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for _ in 0..5 {
                        ledger
                            .try_record_search("dune", &movie(438631, "Dune", "/dune.jpg"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ledger.find("dune").unwrap().unwrap().count, 31);
    }

    #[test]
    fn read_only_handle_never_creates_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere").join("popularity.db");
        let ledger = SqliteLedger::open_read_only(&missing, IMG);

        assert!(ledger.try_list_top_records(5).is_err());
        assert!(!missing.exists());
        assert!(!dir.path().join("nowhere").exists());
    }

    #[test]
    fn read_only_handle_lists_but_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ledger_in(&dir);
        writer.record_search("alien", &movie(348, "Alien", "/alien.jpg"));

        let reader = SqliteLedger::open_read_only(writer.path(), IMG);
        let top = reader.try_list_top_records(5).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].search_term, "alien");

        assert!(reader
            .try_record_search("alien", &movie(348, "Alien", "/alien.jpg"))
            .is_err());
        assert_eq!(writer.find("alien").unwrap().unwrap().count, 1);
    }

    #[test]
    fn unreachable_store_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the database file should be makes every open fail.
        let blocked = dir.path().join("blocked.db");
        fs::create_dir_all(&blocked).unwrap();
        let ledger = SqliteLedger::new(&blocked, IMG);

        ledger.record_search("dune", &movie(1, "Dune", "/d.jpg"));
        assert!(ledger.list_top_records(5).is_empty());
        assert!(ledger.try_list_top_records(5).is_err());
    }
}
