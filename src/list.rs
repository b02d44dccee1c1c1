use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::api::PokemonApi;
use crate::async_state::{lock, AsyncState};
use crate::pagination::{PaginationSnapshot, PaginationState, PaginationUpdate};
use crate::search::SearchState;
use crate::types::{FetchParams, Pokemon};

/// Everything the presentation layer needs to draw the list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub entities: Vec<Pokemon>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: PaginationSnapshot,
    pub is_search_active: bool,
    pub search_query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_pokemons: bool,
}

/// Single source of truth for the displayed list.
///
/// Browse mode (paged fetches) and search mode (single lookup) both write to
/// the same `entities`; an active search owns the list and suppresses paged
/// fetches until it is cleared. Every fetch or search takes a generation from
/// [`AsyncState`] and commits only if no newer operation started meanwhile.
///
/// Starting an operation, the commit-time checks and the commit itself all
/// happen under the `state` lock, and so does [`Self::snapshot`].
///
/// Operations never fail: errors are converted into the `error` field.
#[derive(Debug)]
pub struct ListOrchestrator {
    api: Arc<dyn PokemonApi>,
    search: SearchState,
    state: Mutex<ListState>,
    status: AsyncState,
    base_limit: u32,
}

#[derive(Debug)]
struct ListState {
    entities: Vec<Pokemon>,
    pagination: PaginationState,
    // Page size of the last paged fetch issued; searches never touch it.
    browse_limit: u32,
}

impl ListOrchestrator {
    pub fn new(api: Arc<dyn PokemonApi>, initial_limit: u32) -> Self {
        Self {
            search: SearchState::new(Arc::clone(&api)),
            api,
            state: Mutex::new(ListState {
                entities: Vec::new(),
                pagination: PaginationState::new(initial_limit),
                browse_limit: initial_limit,
            }),
            status: AsyncState::new(),
            base_limit: initial_limit,
        }
    }

    pub fn snapshot(&self) -> ListView {
        let state = lock(&self.state);
        let search = self.search.snapshot();
        ListView {
            has_pokemons: !state.entities.is_empty(),
            entities: state.entities.clone(),
            loading: self.status.loading(),
            error: self.status.error(),
            pagination: state.pagination.snapshot(),
            is_search_active: search.is_active,
            search_query: search.query,
            current_page: state.pagination.current_page(),
            total_pages: state.pagination.total_pages(),
        }
    }

    pub fn browse_limit(&self) -> u32 {
        lock(&self.state).browse_limit
    }

    /// Load one page of the unfiltered catalog. A no-op while a search owns
    /// the list.
    pub async fn fetch_page(&self, params: FetchParams) {
        let (ticket, limit, offset) = {
            let mut state = lock(&self.state);
            if self.search.is_active() {
                debug!("search active, skipping page fetch");
                return;
            }
            let limit = params.limit.unwrap_or_else(|| state.pagination.limit());
            state.browse_limit = limit;
            (self.status.begin(), limit, params.offset.unwrap_or(0))
        };
        info!(limit, offset, "fetching page");

        let result = self.api.list_pokemon(limit, offset).await;

        let mut state = lock(&self.state);
        if !ticket.is_current() {
            debug!(generation = ticket.generation(), "discarding stale page");
            return;
        }
        // A search may have activated while the page was in flight.
        if self.search.is_active() {
            debug!("search took over, discarding page");
            return;
        }

        match result {
            Ok(response) => {
                let total = response.total_count();
                let has_next = response.has_next();
                let has_previous = response.has_previous();
                match response.results {
                    Some(results) => {
                        debug!(count = results.len(), total, "page committed");
                        state.pagination.update_pagination(PaginationUpdate::all(
                            total,
                            limit,
                            offset,
                            has_next,
                            has_previous,
                        ));
                        state.entities = results;
                    }
                    None => {
                        warn!("list response had no results array");
                        state
                            .pagination
                            .update_pagination(PaginationUpdate::all(0, limit, 0, false, false));
                        state.entities.clear();
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "page fetch failed");
                self.status.set_error(e.to_string());
                state.entities.clear();
            }
        }
    }

    /// Look up a single entry by name. A blank query leaves search mode and
    /// reloads the first page at the base page size.
    ///
    /// A failed lookup keeps the search active, shows the error and clears
    /// the list so no stale results sit under the error banner.
    pub async fn search_entities(&self, query: &str) {
        // Activation shares the lock with the fetch guard, so no page fetch
        // can start between this generation and the search taking the list.
        let (ticket, active) = {
            let _state = lock(&self.state);
            (self.status.begin(), self.search.activate(query))
        };
        if !active {
            drop(ticket);
            self.fetch_page(FetchParams {
                limit: Some(self.base_limit),
                offset: Some(0),
            })
            .await;
            return;
        }

        let outcome = self.search.lookup(query).await;

        let mut state = lock(&self.state);
        if !ticket.is_current() {
            debug!(generation = ticket.generation(), "discarding stale search");
            return;
        }
        match outcome {
            Ok(result) => {
                debug!(
                    count = result.entities.len(),
                    active = result.is_search_active,
                    "search committed"
                );
                state.pagination.update_pagination(PaginationUpdate::all(
                    result.total,
                    result.entities.len() as u32,
                    0,
                    false,
                    false,
                ));
                state.entities = result.entities;
            }
            Err(e) => {
                self.status.set_error(e.to_string());
                state.pagination.update_pagination(PaginationUpdate {
                    total: Some(0),
                    offset: Some(0),
                    has_next: Some(false),
                    has_previous: Some(false),
                    ..Default::default()
                });
                state.entities.clear();
            }
        }
    }

    /// Leave search mode and load the first unfiltered page at `limit`.
    pub async fn reset_to_browse_view(&self, limit: u32) {
        {
            let mut state = lock(&self.state);
            self.search.clear_search();
            state.pagination.reset_pagination();
        }
        self.fetch_page(FetchParams {
            limit: Some(limit),
            offset: Some(0),
        })
        .await;
    }

    /// Reload the first page at the page size most recently asked for,
    /// whether or not that fetch succeeded.
    pub async fn refresh(&self) {
        self.reset_to_browse_view(self.browse_limit()).await;
    }

    /// Bound to the search box's clear affordance; same as [`Self::refresh`].
    pub async fn clear_search_and_reload(&self) {
        self.refresh().await;
    }

    /// `page` is zero-based.
    pub async fn go_to_page(&self, page: u32) {
        let request = lock(&self.state).pagination.go_to_page(page);
        debug!(page, %request, "jumping to page");
        self.fetch_page(request.into()).await;
    }

    pub async fn load_next_page(&self) {
        let request = lock(&self.state).pagination.load_next_page();
        match request {
            Some(request) => self.fetch_page(request.into()).await,
            None => debug!("no next page"),
        }
    }

    pub async fn load_previous_page(&self) {
        let request = lock(&self.state).pagination.load_previous_page();
        match request {
            Some(request) => self.fetch_page(request.into()).await,
            None => debug!("no previous page"),
        }
    }

    pub async fn change_limit(&self, limit: u32) {
        let request = lock(&self.state).pagination.change_limit(limit);
        debug!(%request, "page size changed");
        self.fetch_page(request.into()).await;
    }

    pub fn clear_error(&self) {
        self.status.clear_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{page, pokemon, Call, FakeApi};
    use crate::error::DexError;
    use crate::types::PokemonListResponse;

    fn orchestrator(api: &Arc<FakeApi>) -> Arc<ListOrchestrator> {
        Arc::new(ListOrchestrator::new(
            Arc::clone(api) as Arc<dyn PokemonApi>,
            5,
        ))
    }

    async fn wait_for_calls(api: &FakeApi, n: usize) {
        while api.calls().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn first_page() -> PokemonListResponse {
        page(
            vec![pokemon(1, "bulbasaur"), pokemon(2, "ivysaur")],
            1302,
            Some("/api/pokemon?limit=5&offset=5"),
            None,
        )
    }

    #[tokio::test]
    async fn successful_paged_fetch() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);

        list.fetch_page(FetchParams {
            limit: Some(5),
            offset: Some(0),
        })
        .await;

        let view = list.snapshot();
        assert_eq!(
            view.entities,
            vec![pokemon(1, "bulbasaur"), pokemon(2, "ivysaur")]
        );
        assert_eq!(
            view.pagination,
            PaginationSnapshot {
                total: 1302,
                limit: 5,
                offset: 0,
                has_next: true,
                has_previous: false,
            }
        );
        assert!(!view.loading);
        assert_eq!(view.error, None);
        assert!(view.has_pokemons);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 261);
        assert_eq!(api.calls(), vec![Call::List { limit: 5, offset: 0 }]);
    }

    #[tokio::test]
    async fn missing_params_fall_back_to_current_limit_and_zero_offset() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);

        list.fetch_page(FetchParams::default()).await;

        assert_eq!(api.calls(), vec![Call::List { limit: 5, offset: 0 }]);
    }

    #[tokio::test]
    async fn malformed_list_response_is_empty_not_error() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Ok(PokemonListResponse::default()));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;

        list.load_next_page().await;

        let view = list.snapshot();
        assert!(view.entities.is_empty());
        assert!(!view.has_pokemons);
        assert_eq!(view.error, None);
        assert_eq!(view.pagination.total, 0);
        assert_eq!(view.pagination.offset, 0);
        assert!(!view.pagination.has_next);
        assert!(!view.pagination.has_previous);
    }

    #[tokio::test]
    async fn failed_fetch_sets_error_and_clears_list() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Err(DexError::Unauthorized));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;

        list.refresh().await;

        let view = list.snapshot();
        assert!(view.entities.is_empty());
        assert_eq!(view.error.as_deref(), Some("Unauthorized. Please login again."));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn missing_credential_surfaces_as_error() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Err(DexError::Unauthenticated));
        let list = orchestrator(&api);

        list.fetch_page(FetchParams::default()).await;

        assert_eq!(
            list.snapshot().error.as_deref(),
            Some("No authentication token found. Please login first.")
        );
    }

    #[tokio::test]
    async fn search_hit_replaces_list_and_flattens_pagination() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;

        list.search_entities("pikachu").await;

        let view = list.snapshot();
        assert_eq!(view.entities, vec![pokemon(25, "pikachu")]);
        assert!(view.is_search_active);
        assert_eq!(view.search_query, "pikachu");
        assert_eq!(
            view.pagination,
            PaginationSnapshot {
                total: 1,
                limit: 1,
                offset: 0,
                has_next: false,
                has_previous: false,
            }
        );
        assert_eq!(view.total_pages, 1);
    }

    #[tokio::test]
    async fn active_search_suppresses_paged_fetches() {
        let api = Arc::new(FakeApi::default());
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);
        list.search_entities("pikachu").await;

        list.fetch_page(FetchParams {
            limit: Some(5),
            offset: Some(0),
        })
        .await;
        list.load_next_page().await;
        list.change_limit(10).await;

        assert_eq!(list.snapshot().entities, vec![pokemon(25, "pikachu")]);
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn search_with_no_match() {
        let api = Arc::new(FakeApi::default());
        api.push_search(Ok(Some(Pokemon::default())));
        let list = orchestrator(&api);

        list.search_entities("zzz").await;

        let view = list.snapshot();
        assert!(view.entities.is_empty());
        assert_eq!(view.pagination.total, 0);
        assert!(view.is_search_active);
        assert_eq!(view.error, None);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 0);
    }

    #[tokio::test]
    async fn search_network_failure_keeps_query_and_clears_list() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_search(Err(DexError::Network("Network error".into())));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;

        list.search_entities("pikachu").await;

        let view = list.snapshot();
        assert_eq!(view.error.as_deref(), Some("Network error"));
        assert!(!view.loading);
        assert!(view.is_search_active);
        assert_eq!(view.search_query, "pikachu");
        assert!(view.entities.is_empty());
        assert_eq!(view.pagination.total, 0);
    }

    #[tokio::test]
    async fn empty_search_restores_browse_mode_at_base_limit() {
        let api = Arc::new(FakeApi::default());
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);
        list.search_entities("pikachu").await;

        list.search_entities("").await;

        let view = list.snapshot();
        assert!(!view.is_search_active);
        assert_eq!(view.search_query, "");
        assert_eq!(view.entities.len(), 2);
        assert_eq!(
            api.calls(),
            vec![
                Call::Search("pikachu".into()),
                Call::List { limit: 5, offset: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn refresh_after_search_uses_browse_page_size() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Ok(first_page()));
        api.push_list(Ok(first_page()));
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;
        list.change_limit(20).await;
        list.search_entities("pikachu").await;

        list.refresh().await;

        let view = list.snapshot();
        assert!(!view.is_search_active);
        assert_eq!(view.pagination.limit, 20);
        assert_eq!(view.pagination.offset, 0);
        assert_eq!(
            api.calls().last(),
            Some(&Call::List {
                limit: 20,
                offset: 0
            })
        );
    }

    #[tokio::test]
    async fn refresh_after_failed_resize_retries_new_size() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Err(DexError::Network("Network error".into())));
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;
        list.change_limit(20).await;
        assert_eq!(list.snapshot().error.as_deref(), Some("Network error"));
        assert_eq!(list.browse_limit(), 20);

        list.refresh().await;

        assert_eq!(
            api.calls().last(),
            Some(&Call::List {
                limit: 20,
                offset: 0
            })
        );
        assert_eq!(list.snapshot().error, None);
    }

    #[tokio::test]
    async fn search_does_not_change_browse_limit() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);
        list.change_limit(10).await;

        list.search_entities("pikachu").await;

        assert_eq!(list.snapshot().pagination.limit, 1);
        assert_eq!(list.browse_limit(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_page_and_search_leave_search_in_charge() {
        for _ in 0..50 {
            let api = Arc::new(FakeApi::default());
            api.push_list(Ok(first_page()));
            api.push_search(Ok(Some(pokemon(25, "pikachu"))));
            let list = orchestrator(&api);

            let page = {
                let list = Arc::clone(&list);
                tokio::spawn(async move { list.fetch_page(FetchParams::default()).await })
            };
            let search = {
                let list = Arc::clone(&list);
                tokio::spawn(async move { list.search_entities("pikachu").await })
            };
            page.await.unwrap();
            search.await.unwrap();

            let view = list.snapshot();
            assert!(view.is_search_active);
            assert_eq!(view.entities, vec![pokemon(25, "pikachu")]);
            assert_eq!(view.pagination.limit, 1);
            assert!(!view.loading);
        }
    }

    #[tokio::test]
    async fn snapshot_pairs_entities_with_their_pagination() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;
        list.search_entities("pikachu").await;

        let view = list.snapshot();

        assert_eq!(view.entities.len() as u32, view.pagination.limit);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.current_page, 1);
    }

    #[tokio::test]
    async fn clear_search_and_reload_matches_refresh() {
        let api = Arc::new(FakeApi::default());
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);
        list.search_entities("pikachu").await;

        list.clear_search_and_reload().await;

        let view = list.snapshot();
        assert!(!view.is_search_active);
        assert_eq!(view.entities.len(), 2);
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn navigation_without_markers_issues_no_fetch() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(page(vec![pokemon(1, "bulbasaur")], 1, None, None)));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;
        let before = list.snapshot();

        list.load_next_page().await;
        list.load_previous_page().await;

        assert_eq!(api.list_calls(), 1);
        assert_eq!(list.snapshot(), before);
    }

    #[tokio::test]
    async fn next_then_previous_walks_offsets() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Ok(page(
            vec![pokemon(6, "charizard")],
            1302,
            Some("next"),
            Some("prev"),
        )));
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);
        list.fetch_page(FetchParams::default()).await;

        list.load_next_page().await;
        assert_eq!(list.snapshot().current_page, 2);
        list.load_previous_page().await;

        assert_eq!(
            api.calls(),
            vec![
                Call::List { limit: 5, offset: 0 },
                Call::List { limit: 5, offset: 5 },
                Call::List { limit: 5, offset: 0 },
            ]
        );
        assert_eq!(list.snapshot().current_page, 1);
    }

    #[tokio::test]
    async fn go_to_page_is_zero_based() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);

        list.go_to_page(3).await;

        assert_eq!(api.calls(), vec![Call::List { limit: 5, offset: 15 }]);
        assert_eq!(list.snapshot().current_page, 4);
    }

    #[tokio::test]
    async fn change_limit_restarts_at_first_page() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(first_page()));
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);
        list.go_to_page(7).await;

        list.change_limit(10).await;

        assert_eq!(api.calls().last(), Some(&Call::List { limit: 10, offset: 0 }));
        assert_eq!(list.snapshot().pagination.offset, 0);
    }

    #[tokio::test]
    async fn clear_error_touches_nothing_else() {
        let api = Arc::new(FakeApi::default());
        api.push_search(Err(DexError::Http(500)));
        let list = orchestrator(&api);
        list.search_entities("pikachu").await;
        let before = list.snapshot();

        list.clear_error();

        let after = list.snapshot();
        assert_eq!(after.error, None);
        assert_eq!(after.entities, before.entities);
        assert_eq!(after.is_search_active, before.is_search_active);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn stale_page_does_not_overwrite_newer_page() {
        let api = Arc::new(FakeApi::default());
        let slow = api.gate_list();
        api.push_list(Ok(page(vec![pokemon(21, "spearow")], 1302, Some("n"), Some("p"))));
        let list = orchestrator(&api);

        let first = {
            let list = Arc::clone(&list);
            tokio::spawn(async move { list.go_to_page(1).await })
        };
        wait_for_calls(&api, 1).await;

        list.go_to_page(4).await;
        assert!(list.snapshot().loading, "older fetch still outstanding");

        slow.send(Ok(page(vec![pokemon(6, "charizard")], 1302, Some("n"), Some("p"))))
            .unwrap();
        first.await.unwrap();

        let view = list.snapshot();
        assert_eq!(view.entities, vec![pokemon(21, "spearow")]);
        assert_eq!(view.pagination.offset, 20);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn late_page_does_not_clobber_search() {
        let api = Arc::new(FakeApi::default());
        let slow = api.gate_list();
        api.push_search(Ok(Some(pokemon(25, "pikachu"))));
        let list = orchestrator(&api);

        let fetch = {
            let list = Arc::clone(&list);
            tokio::spawn(async move { list.fetch_page(FetchParams::default()).await })
        };
        wait_for_calls(&api, 1).await;

        list.search_entities("pikachu").await;
        slow.send(Ok(first_page())).unwrap();
        fetch.await.unwrap();

        let view = list.snapshot();
        assert_eq!(view.entities, vec![pokemon(25, "pikachu")]);
        assert!(view.is_search_active);
        assert_eq!(view.pagination.total, 1);
    }

    #[tokio::test]
    async fn stale_failure_does_not_raise_error() {
        let api = Arc::new(FakeApi::default());
        let slow = api.gate_list();
        api.push_list(Ok(first_page()));
        let list = orchestrator(&api);

        let first = {
            let list = Arc::clone(&list);
            tokio::spawn(async move { list.go_to_page(2).await })
        };
        wait_for_calls(&api, 1).await;
        list.refresh().await;

        slow.send(Err(DexError::Http(502))).unwrap();
        first.await.unwrap();

        let view = list.snapshot();
        assert_eq!(view.error, None);
        assert_eq!(view.entities.len(), 2);
    }

    #[tokio::test]
    async fn repeated_clear_search_triggers_no_fetch() {
        let api = Arc::new(FakeApi::default());
        let list = orchestrator(&api);

        list.search.clear_search();
        list.search.clear_search();

        let view = list.snapshot();
        assert!(!view.is_search_active);
        assert_eq!(view.search_query, "");
        assert!(api.calls().is_empty());
    }
}
