//! SQLite store
//!
//! `predictions` holds one row per ingested request, `metrics` one row per
//! drift report. Drift vectors are stored as JSON text columns so the
//! dashboard can chart them per feature.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::logic::drift::DriftReport;
use crate::logic::features::Observation;
use super::{Sink, SinkError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS predictions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        request_id TEXT NOT NULL,
        prediction REAL NOT NULL,
        features TEXT NOT NULL,
        timestamp REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS metrics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp REAL NOT NULL,
        median_value REAL,
        mean_value REAL,
        std_value REAL,
        drift_score REAL,
        mean_ratio REAL,
        median_ratio REAL,
        std_ratio REAL,
        alert INTEGER,
        mean_drift_vals TEXT,
        median_drift_vals TEXT,
        std_drift_vals TEXT,
        window_size INTEGER
    );
";

/// Tables managed by this sink
pub const TABLES: &[&str] = &["predictions", "metrics"];

pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, SinkError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, SinkError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Delete every row and reset the autoincrement counters
    pub fn clear(&self) -> Result<(), SinkError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "BEGIN;
             DELETE FROM predictions;
             DELETE FROM metrics;
             DELETE FROM sqlite_sequence WHERE name IN ('predictions', 'metrics');
             COMMIT;",
        )?;
        log::info!("Cleared predictions and metrics tables");
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> Result<u64, SinkError> {
        if !TABLES.contains(&table) {
            return Err(SinkError::Unavailable(format!("unknown table '{}'", table)));
        }

        let conn = self.conn.lock();
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Most recent drift reports, newest first
    pub fn recent_reports(&self, limit: usize) -> Result<Vec<DriftReport>, SinkError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT timestamp, median_value, mean_value, std_value, drift_score,
                    mean_ratio, median_ratio, std_ratio, alert,
                    mean_drift_vals, median_drift_vals, std_drift_vals, window_size
             FROM metrics ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(StoredReport {
                timestamp: row.get(0)?,
                median_value: row.get(1)?,
                mean_value: row.get(2)?,
                std_value: row.get(3)?,
                drift_score: row.get(4)?,
                mean_ratio: row.get(5)?,
                median_ratio: row.get(6)?,
                std_ratio: row.get(7)?,
                alert: row.get(8)?,
                mean_drift: row.get(9)?,
                median_drift: row.get(10)?,
                std_drift: row.get(11)?,
                window_size: row.get(12)?,
            })
        })?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?.into_report()?);
        }
        Ok(reports)
    }
}

impl Sink for SqliteSink {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError> {
        let features = serde_json::to_string(&observation.features)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO predictions (request_id, prediction, features, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                observation.request_id,
                observation.prediction,
                features,
                to_epoch_seconds(observation.timestamp),
            ],
        )?;
        Ok(())
    }

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError> {
        let mean_drift = serde_json::to_string(&report.mean_drift)?;
        let median_drift = serde_json::to_string(&report.median_drift)?;
        let std_drift = serde_json::to_string(&report.std_drift)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO metrics (
                timestamp, median_value, mean_value, std_value, drift_score,
                mean_ratio, median_ratio, std_ratio, alert,
                mean_drift_vals, median_drift_vals, std_drift_vals, window_size
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                to_epoch_seconds(report.timestamp),
                report.median_value,
                report.mean_value,
                report.std_value,
                report.drift_score,
                report.mean_ratio,
                report.median_ratio,
                report.std_ratio,
                report.alert as i64,
                mean_drift,
                median_drift,
                std_drift,
                report.window_size as i64,
            ],
        )?;
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Unix seconds with sub-second precision, as the dashboard expects
fn to_epoch_seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_micros() as f64 / 1_000_000.0
}

fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, SinkError> {
    if !secs.is_finite() {
        return Err(SinkError::InvalidTimestamp(secs));
    }
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64)
        .ok_or(SinkError::InvalidTimestamp(secs))
}

struct StoredReport {
    timestamp: f64,
    median_value: f64,
    mean_value: f64,
    std_value: f64,
    drift_score: f64,
    mean_ratio: f64,
    median_ratio: f64,
    std_ratio: f64,
    alert: i64,
    mean_drift: String,
    median_drift: String,
    std_drift: String,
    window_size: i64,
}

impl StoredReport {
    fn into_report(self) -> Result<DriftReport, SinkError> {
        Ok(DriftReport {
            timestamp: from_epoch_seconds(self.timestamp)?,
            window_size: self.window_size.max(0) as usize,
            mean_value: self.mean_value,
            median_value: self.median_value,
            std_value: self.std_value,
            mean_drift: serde_json::from_str(&self.mean_drift)?,
            median_drift: serde_json::from_str(&self.median_drift)?,
            std_drift: serde_json::from_str(&self.std_drift)?,
            mean_ratio: self.mean_ratio,
            median_ratio: self.median_ratio,
            std_ratio: self.std_ratio,
            drift_score: self.drift_score,
            alert: self.alert != 0,
        })
    }
}
