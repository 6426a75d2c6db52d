//! Application state management

use crate::cache::TokenCache;
use crate::config::Config;
use crate::query::QueryPolicy;
use crate::reader::Reader;
use crate::search::SearchEngine;
use crate::session::SearchSession;
use crate::settings::SettingsStore;
use crate::store::{PageStore, SqliteStore};
use crate::summary::Summarizer;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Application state holding the library store and everything built on it
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PageStore>,
    pub search_engine: Arc<SearchEngine>,
    pub session: Arc<SearchSession>,
    pub token_cache: Arc<TokenCache>,
    pub reader: Reader,
    pub settings: SettingsStore,
    pub query_policy: QueryPolicy,
}

impl AppState {
    /// Open the library at `config.db_path()` read-only and the settings
    /// database beside it
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.db_path();
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open library at {:?}", db_path))?;
        Self::with_store(config, Arc::new(store))
    }

    /// Build the state around an already opened store
    pub fn with_store(config: Config, store: Arc<dyn PageStore>) -> Result<Self> {
        let settings_path = config.settings_db_path();
        let settings = SettingsStore::open(&settings_path)
            .with_context(|| format!("Failed to open settings at {:?}", settings_path))?;

        let token_cache = Arc::new(TokenCache::new(config.cache_capacity));
        let search_engine = Arc::new(
            SearchEngine::new(store.clone())
                .with_summarizer(Summarizer::new(config.summary_window))
                .with_token_cache(token_cache.clone()),
        );
        let session = Arc::new(SearchSession::new(search_engine.clone()));
        let reader = Reader::new(store.clone());
        let query_policy = QueryPolicy::new(config.min_query_length);

        tracing::info!(data_dir = ?config.data_dir, window = config.summary_window, "library opened");

        Ok(Self {
            config,
            store,
            search_engine,
            session,
            token_cache,
            reader,
            settings,
            query_policy,
        })
    }
}
