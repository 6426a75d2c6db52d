//! Pope Books - Offline Arabic Religious Library Reader
//!
//! Backend library providing page reading and content search over a read-only
//! library of books.

// Normalization and tokens come first as summaries and search build on them
pub mod normalize;
pub mod tokens;
pub mod summary;
pub mod query;
pub mod store;
pub mod search;
pub mod cache;
pub mod reader;
pub mod settings;
pub mod session;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::TokenCache;
pub use config::{get_data_dir, Config};
pub use error::PopebooksError;
pub use normalize::{comparison_key, normalize_arabic};
pub use query::{sanitize, QueryPolicy};
pub use reader::{BookInfo, PageView, Reader, ReaderPosition};
pub use search::{SearchEngine, SearchResult, SearchResults, SearchScope};
pub use session::SearchSession;
pub use settings::SettingsStore;
pub use state::AppState;
pub use store::{Book, PageMatch, PageStore, SqliteStore};
pub use summary::{summarize, Highlight, Summarizer};
pub use tokens::{tokenize, PageKey, ScriptBlock, Tokenizer};
