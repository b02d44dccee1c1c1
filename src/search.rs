use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::api::PokemonApi;
use crate::async_state::lock;
use crate::error::Result;
use crate::types::Pokemon;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub is_active: bool,
    /// Last submitted query exactly as typed, or empty when inactive.
    pub query: String,
}

/// A lookup result normalized to the same list shape as a paged fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub entities: Vec<Pokemon>,
    pub total: u32,
    pub is_search_active: bool,
}

/// Owns the "is a search active" flag and runs the single-entity lookup.
///
/// There is no internal lock around the network call: overlapping searches
/// are sequenced by the list orchestrator.
#[derive(Debug)]
pub struct SearchState {
    api: Arc<dyn PokemonApi>,
    snapshot: Mutex<SearchSnapshot>,
}

impl SearchState {
    pub fn new(api: Arc<dyn PokemonApi>) -> Self {
        Self {
            api,
            snapshot: Mutex::new(SearchSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        lock(&self.snapshot).clone()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.snapshot).is_active
    }

    /// Returns `Ok(None)` for a blank query (search cleared, no network call).
    ///
    /// A non-blank query activates the search before the lookup resolves. On
    /// failure the error is returned and the search stays active, so the
    /// attempted query remains visible next to the error.
    pub async fn perform_search(&self, query: &str) -> Result<Option<SearchResult>> {
        if !self.activate(query) {
            return Ok(None);
        }
        self.lookup(query).await.map(Some)
    }

    /// Enter search mode for `query`, or leave it when `query` is blank.
    /// Returns whether a search is now active.
    pub(crate) fn activate(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            self.clear_search();
            return false;
        }
        let mut snapshot = lock(&self.snapshot);
        snapshot.is_active = true;
        snapshot.query = query.to_string();
        true
    }

    /// The network half of [`Self::perform_search`]; expects [`Self::activate`]
    /// to have run.
    pub(crate) async fn lookup(&self, query: &str) -> Result<SearchResult> {
        debug!(query, "searching");
        let hit = self.api.search_pokemon(query).await.map_err(|e| {
            warn!(query, error = %e, "search failed");
            e
        })?;

        let entities = match hit {
            Some(pokemon) if pokemon.is_identified() => vec![pokemon],
            _ => Vec::new(),
        };
        Ok(SearchResult {
            total: entities.len() as u32,
            entities,
            is_search_active: true,
        })
    }

    pub fn clear_search(&self) {
        *lock(&self.snapshot) = SearchSnapshot::default();
    }
}
