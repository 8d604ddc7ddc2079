//! Local persistence collaborators for finished tests.
//!
//! The engine never talks to these directly; the host hands each completed
//! result to a sink once and only reports failures.

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::result::{ResultRecord, TestResult};
use chrono::{DateTime, Local};
use rusqlite::{params, types::Type, Connection};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Receives one record per completed test
pub trait ResultSink {
    fn submit(&mut self, record: &ResultRecord) -> Result<()>;
}

/// Hands `result` to `sink` and turns a failure into a user-facing notice.
/// The result itself stays valid whatever happens here.
pub fn submit_result(sink: &mut dyn ResultSink, result: &TestResult) -> Option<String> {
    match sink.submit(&result.record()) {
        Ok(()) => {
            debug!(wpm = result.wpm, "result saved");
            None
        }
        Err(e) => {
            warn!("failed to save result: {e}");
            Some(format!("Result not saved: {e}"))
        }
    }
}

/// SQLite-backed result store
#[derive(Debug)]
pub struct ResultsDb {
    conn: Connection,
}

impl ResultsDb {
    /// Opens the database at the default state location
    pub fn new() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("keyrush_results.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS typing_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                errors INTEGER NOT NULL,
                characters INTEGER NOT NULL,
                duration INTEGER NOT NULL,
                mode TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_typing_results_recorded_at ON typing_results(recorded_at)",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM typing_results", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Most recent records first
    pub fn recent(&self, limit: usize) -> Result<Vec<ResultRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT wpm, accuracy, duration, errors, characters, mode, recorded_at
            FROM typing_results
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            let recorded_at: String = row.get(6)?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map(|dt| dt.with_timezone(&Local))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
                })?;
            Ok(ResultRecord {
                wpm: row.get(0)?,
                accuracy: row.get(1)?,
                duration: row.get::<_, i64>(2)? as u64,
                errors: row.get::<_, i64>(3)? as usize,
                characters: row.get::<_, i64>(4)? as usize,
                mode: row.get(5)?,
                recorded_at,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl ResultSink for ResultsDb {
    fn submit(&mut self, record: &ResultRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO typing_results
            (wpm, accuracy, errors, characters, duration, mode, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.wpm,
                record.accuracy,
                record.errors as i64,
                record.characters as i64,
                record.duration as i64,
                record.mode,
                record.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

/// Append-only CSV log of results, header written on first use
#[derive(Debug, Clone)]
pub struct CsvResultLog {
    path: PathBuf,
}

impl CsvResultLog {
    pub fn new() -> Self {
        let path = AppDirs::results_log_path().unwrap_or_else(|| PathBuf::from("keyrush_log.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for CsvResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for CsvResultLog {
    fn submit(&mut self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

/// Fans a record out to several sinks; every sink is attempted and the first error is returned
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for SinkSet {
    fn submit(&mut self, record: &ResultRecord) -> Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.submit(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
