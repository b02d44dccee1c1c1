use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Pokemon, PokemonListResponse};

/// The remote catalog. Implementations attach credentials themselves; the
/// list logic only sees results and error messages.
#[async_trait]
pub trait PokemonApi: Send + Sync + std::fmt::Debug {
    /// `GET /api/pokemon?limit=&offset=`
    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonListResponse>;

    /// Single-entity lookup by name. `Ok(None)` means the server answered
    /// but the body did not describe a Pokemon.
    async fn search_pokemon(&self, name: &str) -> Result<Option<Pokemon>>;

    async fn get_pokemon(&self, id: u64) -> Result<Pokemon>;
}
