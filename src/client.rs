use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::PokemonApi;
use crate::error::{DexError, Result};
use crate::session::CredentialProvider;
use crate::types::{Pokemon, PokemonListResponse};

pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for DexError {
    fn from(err: reqwest::Error) -> Self {
        DexError::Network(format!("Network error: {}", err))
    }
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET with the bearer token. An empty body decodes as `Value::Null`.
    async fn get_value(&self, url: &str, not_found: impl FnOnce() -> String) -> Result<Value> {
        let token = self.credentials.token().ok_or(DexError::Unauthenticated)?;

        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "request failed");
            return Err(status_error(status, not_found));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| DexError::Decode(e.to_string()))
    }
}

pub(crate) fn status_error(status: StatusCode, not_found: impl FnOnce() -> String) -> DexError {
    match status.as_u16() {
        401 => DexError::Unauthorized,
        403 => DexError::Forbidden,
        404 => DexError::NotFound(not_found()),
        other => DexError::Http(other),
    }
}

#[async_trait]
impl PokemonApi for HttpClient {
    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonListResponse> {
        let url = self.api_url(&format!("/pokemon?limit={}&offset={}", limit, offset));
        let value = self
            .get_value(&url, || "Pokemon endpoint not found.".to_string())
            .await?;

        if !value.is_object() {
            return Ok(PokemonListResponse::default());
        }
        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "unexpected list response shape");
            PokemonListResponse::default()
        }))
    }

    async fn search_pokemon(&self, name: &str) -> Result<Option<Pokemon>> {
        let url = self.api_url(&format!(
            "/pokemon/search/{}",
            urlencoding::encode(name)
        ));
        let value = self
            .get_value(&url, || format!("Pokemon \"{}\" not found", name))
            .await?;

        if !value.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }

    async fn get_pokemon(&self, id: u64) -> Result<Pokemon> {
        let url = self.api_url(&format!("/pokemon/{}", id));
        let value = self
            .get_value(&url, || "Pokemon not found.".to_string())
            .await?;
        serde_json::from_value(value).map_err(|e| DexError::Decode(e.to_string()))
    }
}
