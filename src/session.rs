//! Background searches where only a caller's newest query is kept

use crate::error::{PopebooksError, Result};
use crate::search::{SearchEngine, SearchResults, SearchScope};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One search screen: a caller together with the scope it searches
type ScreenKey = (String, SearchScope);

/// Runs searches on the blocking pool and drops results of any search that was
/// overtaken by a newer one from the same caller and scope before it finished.
/// Searches from different callers, or from one caller in different scopes,
/// never discard each other.
pub struct SearchSession {
    engine: Arc<SearchEngine>,
    next_ticket: AtomicU64,
    latest: Mutex<HashMap<ScreenKey, u64>>,
}

impl SearchSession {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self {
            engine,
            next_ticket: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<SearchEngine> {
        &self.engine
    }

    /// Ticket of the most recent search started by `caller` in `scope`
    pub fn current_generation(&self, caller: &str, scope: SearchScope) -> Option<u64> {
        self.screens().get(&(caller.to_string(), scope)).copied()
    }

    /// Search off the calling thread with no discarding
    pub async fn run(&self, scope: SearchScope, query: String) -> Result<SearchResults> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.search_with_stats(scope, &query))
            .await
            .map_err(|e| PopebooksError::Search(format!("Task join error: {}", e)))?
    }

    /// Search off the calling thread. Returns `None` when `caller` started a
    /// newer search in the same scope while this one ran.
    pub async fn search(
        &self,
        caller: &str,
        scope: SearchScope,
        query: String,
    ) -> Result<Option<SearchResults>> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.screens().insert((caller.to_string(), scope), ticket);

        let results = self.run(scope, query).await?;

        let latest = self.current_generation(caller, scope);
        if latest != Some(ticket) {
            tracing::debug!(caller, ticket, ?latest, "discarding superseded search");
            return Ok(None);
        }
        Ok(Some(results))
    }

    fn screens(&self) -> std::sync::MutexGuard<'_, HashMap<ScreenKey, u64>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
