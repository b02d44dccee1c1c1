use std::sync::{Arc, Mutex};

use crate::api::PokemonApi;
use crate::async_state::{lock, AsyncState};
use crate::types::Pokemon;

/// Loads the full record behind a list entry for the detail popup.
#[derive(Debug)]
pub struct DetailLoader {
    api: Arc<dyn PokemonApi>,
    pokemon: Mutex<Option<Pokemon>>,
    current_id: Mutex<Option<u64>>,
    status: AsyncState,
}

impl DetailLoader {
    pub fn new(api: Arc<dyn PokemonApi>) -> Self {
        Self {
            api,
            pokemon: Mutex::new(None),
            current_id: Mutex::new(None),
            status: AsyncState::new(),
        }
    }

    /// Id 0 is not a valid record and is ignored.
    pub async fn load(&self, id: u64) -> Option<Pokemon> {
        if id == 0 {
            return None;
        }
        *lock(&self.current_id) = Some(id);
        let fetched = self.status.execute(self.api.get_pokemon(id)).await;
        if let Some(pokemon) = &fetched {
            *lock(&self.pokemon) = Some(pokemon.clone());
        }
        fetched
    }

    pub async fn refetch(&self) -> Option<Pokemon> {
        let id = *lock(&self.current_id);
        match id {
            Some(id) => self.load(id).await,
            None => None,
        }
    }

    pub fn pokemon(&self) -> Option<Pokemon> {
        lock(&self.pokemon).clone()
    }

    pub fn loading(&self) -> bool {
        self.status.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.status.error()
    }

    pub fn clear_error(&self) {
        self.status.clear_error();
    }

    pub fn clear(&self) {
        *lock(&self.pokemon) = None;
        *lock(&self.current_id) = None;
        self.status.clear_error();
    }
}
