//! JSONL Recorder
//!
//! Append-only JSONL writer for observations and drift reports.
//! One `SinkRecord` per line, rotated by size.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use crate::logic::drift::DriftReport;
use crate::logic::features::Observation;
use super::{Sink, SinkError, SinkRecord};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum file size before rotation (50 MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Log file extension
const LOG_EXT: &str = "jsonl";

// ============================================================================
// RECORDER
// ============================================================================

struct ActiveFile {
    writer: BufWriter<File>,
    path: PathBuf,
    size: u64,
    // Bumped on every rotation so two files opened in the same second differ
    sequence: u32,
}

pub struct JsonlSink {
    base_dir: PathBuf,
    max_file_size: u64,
    active: Mutex<ActiveFile>,
}

impl JsonlSink {
    /// Create a new recorder in the given directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        Self::with_max_file_size(base_dir, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(base_dir: impl Into<PathBuf>, max_file_size: u64) -> Result<Self, SinkError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        let active = open_new_file(&base_dir, 0)?;

        Ok(Self {
            base_dir,
            max_file_size,
            active: Mutex::new(active),
        })
    }

    /// Get current log file path
    pub fn current_file(&self) -> PathBuf {
        self.active.lock().path.clone()
    }

    fn append(&self, record: &SinkRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)?;
        let bytes = line.as_bytes();

        let mut active = self.active.lock();

        // Check if rotation needed
        if active.size > 0 && active.size + bytes.len() as u64 + 1 > self.max_file_size {
            active.writer.flush()?;
            let next = open_new_file(&self.base_dir, active.sequence + 1)?;
            log::info!("Rotated from {:?} to {:?}", active.path, next.path);
            *active = next;
        }

        active.writer.write_all(bytes)?;
        active.writer.write_all(b"\n")?;
        active.size += bytes.len() as u64 + 1;

        // Flush for durability
        active.writer.flush()?;
        Ok(())
    }
}

impl Sink for JsonlSink {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError> {
        self.append(&SinkRecord::Observation(observation.clone()))
    }

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError> {
        self.append(&SinkRecord::DriftReport(report.clone()))
    }
}

/// Open a new log file with timestamp
fn open_new_file(base_dir: &Path, sequence: u32) -> Result<ActiveFile, SinkError> {
    let now = Utc::now();
    let filename = format!("drift_{}_{:04}.{}", now.format("%Y_%m_%d_%H%M%S"), sequence, LOG_EXT);
    let path = base_dir.join(filename);

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let size = file.metadata()?.len();

    log::info!("Opened drift log: {:?}", path);
    Ok(ActiveFile {
        writer: BufWriter::new(file),
        path,
        size,
        sequence,
    })
}

// ============================================================================
// QUERY API (for reading logs)
// ============================================================================

/// Read all records from a log file, skipping unparseable lines
pub fn read_records(file_path: &Path) -> std::io::Result<Vec<SinkRecord>> {
    let reader = BufReader::new(File::open(file_path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if !line.is_empty() {
            if let Ok(record) = serde_json::from_str::<SinkRecord>(&line) {
                records.push(record);
            }
        }
    }

    Ok(records)
}

/// Get list of all log files in directory, oldest first
pub fn list_log_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if dir.is_dir() {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == LOG_EXT) {
                files.push(path);
            }
        }
    }

    // Sort by name (which includes timestamp and sequence)
    files.sort();
    Ok(files)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureVector;
    use tempfile::TempDir;

    fn observation(id: &str) -> Observation {
        let fv = FeatureVector::new(vec![0.25; 4], 4).unwrap();
        Observation::new(Utc::now(), id, fv, 1.0)
    }

    #[test]
    fn test_recorder_creation() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp_dir.path()).unwrap();
        assert!(sink.current_file().exists());
    }

    #[test]
    fn test_jsonl_format() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlSink::new(temp_dir.path()).unwrap();

        for i in 0..3 {
            sink.store_observation(&observation(&format!("req-{}", i))).unwrap();
        }

        let content = std::fs::read_to_string(sink.current_file()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"kind\":\"observation\""));

        let records = read_records(&sink.current_file()).unwrap();
        match &records[2] {
            SinkRecord::Observation(o) => assert_eq!(o.request_id, "req-2"),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_rotation_creates_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlSink::with_max_file_size(temp_dir.path(), 64).unwrap();
        let first = sink.current_file();

        sink.store_observation(&observation("a")).unwrap();
        sink.store_observation(&observation("b")).unwrap();

        assert_ne!(sink.current_file(), first);

        let files = list_log_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let total: usize = files.iter().map(|f| read_records(f).unwrap().len()).sum();
        assert_eq!(total, 2);
    }
}
