//! Persisted reader preferences: last reading position and last queries

use crate::error::{PopebooksError, Result};
use crate::query::sanitize;
use crate::reader::ReaderPosition;
use crate::search::SearchScope;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub const KEY_STOPPED_AT_BOOK: &str = "stopped_at_book";
pub const KEY_STOPPED_AT_PAGE: &str = "stopped_at_page";
pub const KEY_LAST_SEARCH_TERM: &str = "last_search_term";
pub const KEY_LAST_SEARCH_QUERY: &str = "last_search_query";

fn settings_err(e: rusqlite::Error) -> PopebooksError {
    PopebooksError::Settings(e.to_string())
}

/// Key-value settings kept in their own database, apart from the read-only
/// library so they survive library updates
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open the settings database, creating it and its table if missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        store.connection()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        ).map_err(settings_err)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(settings_err)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection()?
            .query_row("SELECT value FROM app_settings WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(settings_err)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection()?
            .execute(
                "INSERT OR REPLACE INTO app_settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now],
            )
            .map_err(settings_err)?;
        Ok(())
    }

    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        match value.parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                tracing::warn!(key, value = %value, "ignoring unreadable setting");
                Ok(None)
            }
        }
    }

    /// Where the reader stopped; book 1 page 1 when nothing was saved
    pub fn last_position(&self) -> Result<ReaderPosition> {
        let default = ReaderPosition::default();
        Ok(ReaderPosition {
            book_id: self.get_i64(KEY_STOPPED_AT_BOOK)?.unwrap_or(default.book_id),
            page_number: self.get_i64(KEY_STOPPED_AT_PAGE)?.unwrap_or(default.page_number),
        })
    }

    pub fn set_last_position(&self, position: ReaderPosition) -> Result<()> {
        self.set(KEY_STOPPED_AT_BOOK, &position.book_id.to_string())?;
        self.set(KEY_STOPPED_AT_PAGE, &position.page_number.to_string())
    }

    fn query_key(scope: SearchScope) -> &'static str {
        match scope {
            SearchScope::Book(_) => KEY_LAST_SEARCH_QUERY,
            SearchScope::AllBooks => KEY_LAST_SEARCH_TERM,
        }
    }

    /// Last query for the scope; book searches share one entry
    pub fn last_query(&self, scope: SearchScope) -> Result<String> {
        Ok(self.get(Self::query_key(scope))?.unwrap_or_default())
    }

    pub fn set_last_query(&self, scope: SearchScope, query: &str) -> Result<()> {
        self.set(Self::query_key(scope), &sanitize(query))
    }
}
