//! Page-by-page reading, bounded by the number of stored pages

use crate::error::Result;
use crate::store::PageStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReaderPosition {
    pub book_id: i64,
    pub page_number: i64,
}

impl Default for ReaderPosition {
    fn default() -> Self {
        Self { book_id: 1, page_number: 1 }
    }
}

impl ReaderPosition {
    pub fn new(book_id: i64, page_number: i64) -> Self {
        Self { book_id, page_number }
    }

    /// Next page, or `None` on the last page
    pub fn next(&self, page_count: i64) -> Option<Self> {
        (self.page_number < page_count).then(|| Self::new(self.book_id, self.page_number + 1))
    }

    /// Previous page, or `None` on the first page
    pub fn previous(&self) -> Option<Self> {
        (self.page_number > 1).then(|| Self::new(self.book_id, self.page_number - 1))
    }

    /// Keep the page inside `1..=page_count`. Books without pages clamp to 1.
    pub fn clamp(&self, page_count: i64) -> Self {
        Self::new(self.book_id, self.page_number.clamp(1, page_count.max(1)))
    }
}

/// Book listing entry with the live page count next to the declared one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub id: i64,
    pub name: String,
    pub pages: i64,
    pub page_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub book_id: i64,
    pub book_name: String,
    pub page_number: i64,
    pub page_count: i64,
    pub content: String,
    pub has_previous: bool,
    pub has_next: bool,
}

pub struct Reader {
    store: Arc<dyn PageStore>,
}

impl Reader {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    pub fn books(&self) -> Result<Vec<BookInfo>> {
        self.store
            .books()?
            .into_iter()
            .map(|book| -> Result<BookInfo> {
                let page_count = self.store.page_count(book.id)?;
                Ok(BookInfo {
                    id: book.id,
                    name: book.name,
                    pages: book.pages,
                    page_count,
                })
            })
            .collect()
    }

    /// Book name and live page count, `None` for unknown books
    pub fn book(&self, book_id: i64) -> Result<Option<(String, i64)>> {
        let name = self.store.book_name(book_id)?;
        if name.is_empty() {
            return Ok(None);
        }
        Ok(Some((name, self.store.page_count(book_id)?)))
    }

    /// Load a page with its navigation state. Missing pages are `None`.
    pub fn page(&self, position: ReaderPosition) -> Result<Option<PageView>> {
        let Some(content) = self.store.page_content(position.book_id, position.page_number)? else {
            return Ok(None);
        };

        let page_count = self.store.page_count(position.book_id)?;
        let book_name = self.store.book_name(position.book_id)?;

        Ok(Some(PageView {
            book_id: position.book_id,
            book_name,
            page_number: position.page_number,
            page_count,
            content,
            has_previous: position.previous().is_some(),
            has_next: position.next(page_count).is_some(),
        }))
    }
}
