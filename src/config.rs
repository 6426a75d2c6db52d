//! Runtime configuration: data directory resolution and environment overrides

use crate::error::{PopebooksError, Result};
use crate::summary::DEFAULT_WINDOW_SIZE;
use std::path::PathBuf;
use std::str::FromStr;

pub const DB_FILE: &str = "books.db";
pub const SETTINGS_FILE: &str = "settings.db";

pub const ENV_DATA_DIR: &str = "POPEBOOKS_DATA_DIR";
pub const ENV_BIND: &str = "POPEBOOKS_BIND";
pub const ENV_MIN_QUERY_LENGTH: &str = "POPEBOOKS_MIN_QUERY_LENGTH";
pub const ENV_SUMMARY_WINDOW: &str = "POPEBOOKS_SUMMARY_WINDOW";
pub const ENV_CACHE_CAPACITY: &str = "POPEBOOKS_CACHE_CAPACITY";

/// Default token cache capacity (number of pages)
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub min_query_length: usize,
    pub summary_window: usize,
    pub cache_capacity: usize,
}

impl Config {
    /// Defaults rooted at `data_dir`
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            bind_addr: DEFAULT_BIND.to_string(),
            min_query_length: 0,
            summary_window: DEFAULT_WINDOW_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source; `from_env` passes the process
    /// environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(ENV_DATA_DIR) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => get_data_dir(),
        };

        let mut config = Self::new(data_dir);
        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = bind;
        }
        if let Some(value) = lookup(ENV_MIN_QUERY_LENGTH) {
            config.min_query_length = parse_var(ENV_MIN_QUERY_LENGTH, &value)?;
        }
        if let Some(value) = lookup(ENV_SUMMARY_WINDOW) {
            config.summary_window = parse_var(ENV_SUMMARY_WINDOW, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_CAPACITY) {
            config.cache_capacity = parse_var(ENV_CACHE_CAPACITY, &value)?;
        }
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PopebooksError::Config(format!("{} has an invalid value: {:?}", key, value)))
}

/// Locate the directory holding `books.db`.
///
/// Debug builds look in the usual development locations first; otherwise the
/// platform data directory is used.
pub fn get_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_paths = [
            PathBuf::from("data"),
            PathBuf::from("../data"), // api -> workspace root
        ];
        for path in &dev_paths {
            if path.join(DB_FILE).exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    dirs::data_dir()
        .map(|dir| dir.join("popebooks"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
