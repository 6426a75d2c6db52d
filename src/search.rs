//! Content search: substring scan over pages, one summary per matching page

use crate::cache::TokenCache;
use crate::error::Result;
use crate::query::is_blank;
use crate::store::{PageMatch, PageStore};
use crate::summary::Summarizer;
use crate::tokens::PageKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type", content = "book_id")]
pub enum SearchScope {
    Book(i64),
    #[default]
    AllBooks,
}

impl SearchScope {
    pub fn from_book_id(book_id: Option<i64>) -> Self {
        match book_id {
            Some(id) => SearchScope::Book(id),
            None => SearchScope::AllBooks,
        }
    }

    pub fn book_id(&self) -> Option<i64> {
        match self {
            SearchScope::Book(id) => Some(*id),
            SearchScope::AllBooks => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub book_id: i64,
    pub book_name: String,
    pub page_number: i64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub scope: SearchScope,
    pub total: usize,
    pub results: Vec<SearchResult>,
    pub elapsed_ms: u64,
}

pub struct SearchEngine {
    store: Arc<dyn PageStore>,
    summarizer: Summarizer,
    token_cache: Option<Arc<TokenCache>>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self {
            store,
            summarizer: Summarizer::default(),
            token_cache: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_token_cache(mut self, token_cache: Arc<TokenCache>) -> Self {
        self.token_cache = Some(token_cache);
        self
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn search_in_book(&self, book_id: i64, query: &str) -> Result<Vec<SearchResult>> {
        self.search(SearchScope::Book(book_id), query)
    }

    pub fn search_all_books(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search(SearchScope::AllBooks, query)
    }

    /// Pages containing `query`, in the order storage returns them.
    ///
    /// Blank queries return no results without touching storage. The page
    /// filter is plain containment; the summary window is positioned by the
    /// stricter token match, so a page can match here yet get a head-of-page
    /// summary.
    pub fn search(&self, scope: SearchScope, query: &str) -> Result<Vec<SearchResult>> {
        if is_blank(query) {
            return Ok(Vec::new());
        }

        let rows = self.store.find_pages(scope.book_id(), query)?;
        Ok(rows.into_iter().map(|row| self.summarize_row(row, query)).collect())
    }

    /// Same as `search`, with timing and counts for presentation
    pub fn search_with_stats(&self, scope: SearchScope, query: &str) -> Result<SearchResults> {
        let start = Instant::now();
        let results = self.search(scope, query)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(?scope, hits = results.len(), elapsed_ms, "content search finished");

        Ok(SearchResults {
            query: query.to_string(),
            scope,
            total: results.len(),
            results,
            elapsed_ms,
        })
    }

    fn summarize_row(&self, row: PageMatch, query: &str) -> SearchResult {
        let summary = match &self.token_cache {
            Some(cache) => {
                let key = PageKey::new(row.book_id, row.page_number);
                let tokens = cache.get_or_tokenize(&key, &row.content, self.summarizer.tokenizer());
                self.summarizer.summarize_tokens(tokens.as_slice(), query)
            }
            None => self.summarizer.summarize(&row.content, query),
        };

        SearchResult {
            book_id: row.book_id,
            book_name: row.book_name,
            page_number: row.page_number,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PopebooksError;
    use crate::testing::{fixture_store, BrokenStore, CountingStore, FixtureLibrary};

    fn engine(library: &FixtureLibrary) -> (tempfile::TempDir, SearchEngine) {
        let (dir, store) = fixture_store(library);
        (dir, SearchEngine::new(Arc::new(store)))
    }

    #[test]
    fn test_blank_query_skips_storage() {
        let (_dir, store) = fixture_store(&FixtureLibrary::sample());
        let counting = Arc::new(CountingStore::new(store));
        let engine = SearchEngine::new(counting.clone());

        assert!(engine.search_in_book(1, "").unwrap().is_empty());
        assert!(engine.search_in_book(1, "   ").unwrap().is_empty());
        assert!(engine.search_all_books("").unwrap().is_empty());
        assert!(engine.search_all_books("\t\n").unwrap().is_empty());
        assert_eq!(counting.calls(), 0);

        engine.search_all_books("الله").unwrap();
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_book_scope() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        let results = engine.search_in_book(2, "الله").unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.iter().all(|r| r.book_id == 2));
        assert_eq!(results[0].book_name, "كتاب المحبة");
        assert_eq!(results[0].page_number, 2);
    }

    #[test]
    fn test_all_books_is_superset_of_each_book() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        let all = engine.search_all_books("الصلاة").unwrap();
        let book_ids: std::collections::HashSet<i64> = all.iter().map(|r| r.book_id).collect();
        assert!(book_ids.len() > 1);

        for book_id in 1..=3 {
            let scoped = engine.search_in_book(book_id, "الصلاة").unwrap();
            let restricted: Vec<&SearchResult> = all.iter().filter(|r| r.book_id == book_id).collect();
            assert_eq!(scoped.len(), restricted.len());
            for result in &scoped {
                assert!(restricted.contains(&result));
            }
        }
    }

    #[test]
    fn test_storage_order_preserved() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        let results = engine.search_all_books("ال").unwrap();
        let keys: Vec<(i64, i64)> = results.iter().map(|r| (r.book_id, r.page_number)).collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (3, 1), (3, 2)]);
    }

    #[test]
    fn test_summary_centres_on_match() {
        let words: Vec<String> = (0..100).map(|i| format!("ك{}", "ب".repeat(i + 1))).collect();
        let library = FixtureLibrary::new().book(7, "كتاب طويل", &[words.join(" ").as_str()]);
        let (_dir, engine) = engine(&library);

        let results = engine.search_in_book(7, &words[50]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, format!("...{}...", words[35..65].join(" ")));
    }

    #[test]
    fn test_containment_without_token_match_uses_head() {
        // "الروح" + "في" spans a token boundary: "حياة الروح في"
        let words: Vec<String> = (0..40).map(|i| format!("ك{}", "ب".repeat(i + 1))).collect();
        let page = format!("حياة الروح في {}", words.join(" "));
        let library = FixtureLibrary::new().book(1, "كتاب", &[page.as_str()]);
        let (_dir, engine) = engine(&library);

        let query = "روح في";
        let results = engine.search_all_books(query).unwrap();
        assert_eq!(results.len(), 1, "containment should select the page");

        let expected_head: Vec<&str> = ["حياة", "الروح", "في"]
            .into_iter()
            .chain(words.iter().map(String::as_str))
            .take(30)
            .collect();
        assert_eq!(results[0].summary, format!("{}...", expected_head.join(" ")));
    }

    #[test]
    fn test_summary_uses_untrimmed_query() {
        let library = FixtureLibrary::new().book(1, "كتاب", &["الف باء تاء"]);
        let (_dir, engine) = engine(&library);
        // " باء" is contained in the page, but as a word it never equals a token
        let results = engine.search_all_books(" باء").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, "الف باء تاء");
    }

    #[test]
    fn test_diacritics_in_page_still_summarize_around_match() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        let engine = engine.with_summarizer(Summarizer::new(1));
        // page 1/3 is "مَحَبَّةُ اللهِ لا تنتهي": containment needs the raw form
        let results = engine.search_in_book(1, "مَحَبَّةُ").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, "...مَحَبَّةُ...");
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        assert!(engine.search_all_books("غير موجود").unwrap().is_empty());
        assert!(engine.search_in_book(999, "الله").unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let engine = SearchEngine::new(Arc::new(BrokenStore));
        let err = engine.search_all_books("الله").unwrap_err();
        assert!(matches!(err, PopebooksError::Database(_)));
        // blank queries never reach the broken store
        assert!(engine.search_all_books(" ").unwrap().is_empty());
    }

    #[test]
    fn test_token_cache_gives_same_summaries() {
        let (_dir, store) = fixture_store(&FixtureLibrary::sample());
        let store: Arc<dyn PageStore> = Arc::new(store);
        let cache = Arc::new(TokenCache::new(16));
        let plain = SearchEngine::new(store.clone());
        let cached = SearchEngine::new(store).with_token_cache(cache.clone());

        let expected = plain.search_all_books("الله").unwrap();
        assert_eq!(cached.search_all_books("الله").unwrap(), expected);
        let entries = cache.stats().0;
        assert_eq!(entries, expected.len());

        // a second search over the same pages reuses the cached tokens
        assert_eq!(cached.search_all_books("الله").unwrap(), expected);
        assert_eq!(cache.stats().0, entries);
    }

    #[test]
    fn test_search_with_stats() {
        let (_dir, engine) = engine(&FixtureLibrary::sample());
        let results = engine.search_with_stats(SearchScope::Book(1), "الصلاة").unwrap();
        assert_eq!(results.query, "الصلاة");
        assert_eq!(results.scope, SearchScope::Book(1));
        assert_eq!(results.total, 2);
        assert_eq!(results.results.len(), 2);
    }

    #[test]
    fn test_scope_serialization() {
        assert_eq!(
            serde_json::to_value(SearchScope::Book(3)).unwrap(),
            serde_json::json!({"type": "book", "book_id": 3})
        );
        assert_eq!(
            serde_json::to_value(SearchScope::AllBooks).unwrap(),
            serde_json::json!({"type": "all_books"})
        );
        assert_eq!(SearchScope::from_book_id(Some(2)).book_id(), Some(2));
        assert_eq!(SearchScope::from_book_id(None), SearchScope::AllBooks);
    }
}
