//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment at startup.

use std::path::PathBuf;

/// Default window capacity (most recent observations kept)
pub const DEFAULT_WINDOW_CAPACITY: usize = 10_000;

/// Default window occupancy above which a recompute pass runs
pub const DEFAULT_TRIGGER_THRESHOLD: usize = 500;

/// Default per-feature absolute drift threshold
pub const DEFAULT_FEATURE_THRESHOLD: f64 = 0.3;

/// Default global drift score threshold
pub const DEFAULT_GLOBAL_THRESHOLD: f64 = 0.3;

/// Default number of features per request
pub const DEFAULT_FEATURE_COUNT: usize = 8;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "drift-monitor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get window capacity from environment or use default
pub fn get_window_capacity() -> usize {
    env_parse("DRIFT_WINDOW_CAPACITY", DEFAULT_WINDOW_CAPACITY)
}

/// Get trigger threshold from environment or use default
pub fn get_trigger_threshold() -> usize {
    env_parse("DRIFT_TRIGGER_THRESHOLD", DEFAULT_TRIGGER_THRESHOLD)
}

/// Get per-feature drift threshold from environment or use default
pub fn get_feature_threshold() -> f64 {
    env_parse("DRIFT_FEATURE_THRESHOLD", DEFAULT_FEATURE_THRESHOLD)
}

/// Get global alert threshold from environment or use default
pub fn get_global_threshold() -> f64 {
    env_parse("DRIFT_GLOBAL_THRESHOLD", DEFAULT_GLOBAL_THRESHOLD)
}

/// Get feature count from environment or use default
pub fn get_feature_count() -> usize {
    env_parse("DRIFT_FEATURE_COUNT", DEFAULT_FEATURE_COUNT)
}

/// Comma separated feature names, if overridden
pub fn get_feature_names() -> Option<Vec<String>> {
    let raw = std::env::var("DRIFT_FEATURE_NAMES").ok()?;
    let names: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() { None } else { Some(names) }
}

/// Base data directory for this app
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get baseline file path from environment or use default
pub fn get_baseline_path() -> PathBuf {
    std::env::var("DRIFT_BASELINE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_data_dir().join("baseline_v1.json"))
}

/// Get SQLite database path from environment or use default
pub fn get_db_path() -> PathBuf {
    std::env::var("DRIFT_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_data_dir().join("monitoring.db"))
}

/// JSONL log directory; when set, records go there instead of SQLite
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var("DRIFT_LOG_DIR").ok().map(PathBuf::from)
}
