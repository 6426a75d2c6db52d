//! Read-only access to the book library stored in SQLite

use crate::error::Result;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    /// Page count declared in the `books` table. Not maintained when the library
    /// is built, so page bounds come from `PageStore::page_count` instead.
    pub pages: i64,
}

/// A page whose content matched a containment search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMatch {
    pub book_id: i64,
    pub book_name: String,
    pub page_number: i64,
    pub content: String,
}

/// Query surface of the book library.
///
/// Lookups that find nothing return sentinels (`""`, `0`, `None`); only storage
/// failures are errors.
pub trait PageStore: Send + Sync {
    /// All books in storage order
    fn books(&self) -> Result<Vec<Book>>;

    /// Book name, or an empty string when the book does not exist
    fn book_name(&self, book_id: i64) -> Result<String>;

    /// Number of page rows for the book
    fn page_count(&self, book_id: i64) -> Result<i64>;

    fn page_content(&self, book_id: i64, page_number: i64) -> Result<Option<String>>;

    /// Pages whose content contains `substring`, optionally limited to one book,
    /// in the order storage returns them
    fn find_pages(&self, book_id: Option<i64>, substring: &str) -> Result<Vec<PageMatch>>;
}

const BOOK_COLUMNS: &str = "id, name, pages";

fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        name: row.get(1)?,
        pages: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
    })
}

fn row_to_match(row: &Row) -> rusqlite::Result<PageMatch> {
    Ok(PageMatch {
        book_id: row.get(0)?,
        book_name: row.get(1)?,
        page_number: row.get(2)?,
        content: row.get(3)?,
    })
}

/// Escape LIKE wildcards so the query is matched literally
pub fn like_pattern(substring: &str) -> String {
    let mut pattern = String::with_capacity(substring.len() + 2);
    pattern.push('%');
    for c in substring.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `PageStore` backed by the `books.db` file. Every call opens its own
/// read-only connection, so the store can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self { db_path: db_path.into() }
    }

    /// Open the store, checking that the database and its tables are readable
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(db_path);
        let conn = store.connection()?;
        conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get::<_, i64>(0))?;
        conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get::<_, i64>(0))?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get a new read-only connection (each call creates a new connection)
    pub fn connection(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl PageStore for SqliteStore {
    fn books(&self) -> Result<Vec<Book>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM books", BOOK_COLUMNS))?;
        let books = stmt
            .query_map([], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn book_name(&self, book_id: i64) -> Result<String> {
        let conn = self.connection()?;
        let name: Option<String> = conn
            .query_row("SELECT name FROM books WHERE id = ?1", [book_id], |row| row.get(0))
            .optional()?;
        Ok(name.unwrap_or_default())
    }

    fn page_count(&self, book_id: i64) -> Result<i64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE book_id = ?1",
            [book_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn page_content(&self, book_id: i64, page_number: i64) -> Result<Option<String>> {
        let conn = self.connection()?;
        let content = conn
            .query_row(
                "SELECT content FROM pages WHERE book_id = ?1 AND number = ?2",
                rusqlite::params![book_id, page_number],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    fn find_pages(&self, book_id: Option<i64>, substring: &str) -> Result<Vec<PageMatch>> {
        let conn = self.connection()?;
        let pattern = like_pattern(substring);

        let matches = match book_id {
            Some(id) => {
                let mut stmt = conn.prepare(
                    "SELECT b.id, b.name, p.number, p.content FROM books b JOIN pages p ON b.id = p.book_id
                     WHERE b.id = ?1 AND p.content LIKE ?2 ESCAPE '\\'",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![id, pattern], row_to_match)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT b.id, b.name, p.number, p.content FROM books b JOIN pages p ON b.id = p.book_id
                     WHERE p.content LIKE ?1 ESCAPE '\\'",
                )?;
                let rows = stmt
                    .query_map([pattern], row_to_match)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(matches)
    }
}
