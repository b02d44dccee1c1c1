use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog entry as returned by both the list and search endpoints.
///
/// Only `id` and `name` are interpreted by the list logic; everything else is
/// carried through for the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub stats: Option<Stats>,
}

impl Pokemon {
    /// True when the entry carries both identifying fields.
    pub fn is_identified(&self) -> bool {
        self.id != 0 && !self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub special_attack: u32,
    pub special_defense: u32,
}

/// Body of `GET /api/pokemon`. Every field is optional so a malformed body
/// still decodes and is treated as "no results" rather than a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PokemonListResponse {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Pokemon>>,
}

impl PokemonListResponse {
    /// `total` wins when it is non-zero, otherwise `count`, otherwise 0.
    pub fn total_count(&self) -> u32 {
        self.total
            .filter(|t| *t > 0)
            .or(self.count)
            .unwrap_or(0)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Concrete fetch parameters computed by pagination math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

/// Parameters for a paged fetch; missing fields fall back to current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<PageRequest> for FetchParams {
    fn from(req: PageRequest) -> Self {
        Self {
            limit: Some(req.limit),
            offset: Some(req.offset),
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit={} offset={}", self.limit, self.offset)
    }
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    /// Servers send this as either a string or a number.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}
