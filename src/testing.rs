//! Fixture libraries and fake stores for tests

use crate::error::{PopebooksError, Result};
use crate::store::{Book, PageMatch, PageStore, SqliteStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
pub struct FixtureLibrary {
    pub books: Vec<(i64, String, Vec<String>)>,
}

impl FixtureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(mut self, id: i64, name: &str, pages: &[&str]) -> Self {
        self.books.push((id, name.to_string(), pages.iter().map(|p| p.to_string()).collect()));
        self
    }

    /// Three small books. Declared page counts are left at zero, as in the
    /// shipped library.
    pub fn sample() -> Self {
        Self::new()
            .book(1, "كتاب الصلاة", &[
                "في الصلاة نقف أمام الله بخشوع",
                "الصلاة هي حياة الروح",
                "مَحَبَّةُ اللهِ لا تنتهي",
            ])
            .book(2, "كتاب المحبة", &[
                "المحبة لا تسقط أبدا",
                "الله محبة ومن يثبت في المحبة يثبت في الله",
            ])
            .book(3, "كتاب الصوم", &[
                "الصوم مع الصلاة يقوي الروح",
                "أيام الصوم المقدس",
            ])
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut conn = rusqlite::Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE books (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                pages INTEGER
            );
            CREATE TABLE pages (
                book_id INTEGER NOT NULL,
                number INTEGER NOT NULL,
                content TEXT NOT NULL
            );
            "#,
        )?;

        let tx = conn.transaction()?;
        for (id, name, pages) in &self.books {
            tx.execute(
                "INSERT INTO books (id, name, pages) VALUES (?1, ?2, 0)",
                rusqlite::params![id, name],
            )?;
            for (i, content) in pages.iter().enumerate() {
                tx.execute(
                    "INSERT INTO pages (book_id, number, content) VALUES (?1, ?2, ?3)",
                    rusqlite::params![id, i as i64 + 1, content],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Write `library` into a fresh temp directory and open it read-only
pub fn fixture_store(library: &FixtureLibrary) -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");
    library.write_to(&path).unwrap();
    let store = SqliteStore::open(&path).unwrap();
    (dir, store)
}

/// Wraps a store and counts how often it is queried
pub struct CountingStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: PageStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: PageStore> PageStore for CountingStore<S> {
    fn books(&self) -> Result<Vec<Book>> {
        self.hit();
        self.inner.books()
    }

    fn book_name(&self, book_id: i64) -> Result<String> {
        self.hit();
        self.inner.book_name(book_id)
    }

    fn page_count(&self, book_id: i64) -> Result<i64> {
        self.hit();
        self.inner.page_count(book_id)
    }

    fn page_content(&self, book_id: i64, page_number: i64) -> Result<Option<String>> {
        self.hit();
        self.inner.page_content(book_id, page_number)
    }

    fn find_pages(&self, book_id: Option<i64>, substring: &str) -> Result<Vec<PageMatch>> {
        self.hit();
        self.inner.find_pages(book_id, substring)
    }
}

/// A store whose every query fails, standing in for a corrupt database
pub struct BrokenStore;

impl PageStore for BrokenStore {
    fn books(&self) -> Result<Vec<Book>> {
        Err(PopebooksError::Database("database disk image is malformed".to_string()))
    }

    fn book_name(&self, _book_id: i64) -> Result<String> {
        self.books().map(|_| String::new())
    }

    fn page_count(&self, _book_id: i64) -> Result<i64> {
        self.books().map(|_| 0)
    }

    fn page_content(&self, _book_id: i64, _page_number: i64) -> Result<Option<String>> {
        self.books().map(|_| None)
    }

    fn find_pages(&self, _book_id: Option<i64>, _substring: &str) -> Result<Vec<PageMatch>> {
        self.books().map(|_| Vec::new())
    }
}
