use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
const API_URL_ENV: &str = "DEXVIEW_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListConfig {
    /// Initial page size; also the size restored when a search is cleared.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Sizes offered by the `+`/`-` keys.
    #[serde(default = "default_page_sizes")]
    pub page_sizes: Vec<u32>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_sizes: default_page_sizes(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page_sizes() -> Vec<u32> {
    vec![5, 10, 20, 50]
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("dexview").join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location. A missing or unreadable
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default().with_env(),
            },
        };

        let config = match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }),
            Err(_) => Config::default(),
        };
        config.with_env()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content).map(Config::sanitized)
    }

    /// Zero page sizes would break the page math; drop them.
    fn sanitized(mut self) -> Self {
        if self.list.page_size == 0 {
            self.list.page_size = DEFAULT_PAGE_SIZE;
        }
        self.list.page_sizes.retain(|s| *s > 0);
        if self.list.page_sizes.is_empty() {
            self.list.page_sizes = default_page_sizes();
        }
        self
    }

    fn with_env(self) -> Self {
        self.with_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    pub fn with_overrides(mut self, api_url: Option<String>, page_size: Option<u32>) -> Self {
        self = self.with_api_url(api_url);
        if let Some(size) = page_size.filter(|s| *s > 0) {
            self.list.page_size = size;
        }
        self
    }

    /// The configured size after `current` in the cycle, wrapping around.
    pub fn next_page_size(&self, current: u32) -> u32 {
        let sizes = &self.list.page_sizes;
        match sizes.iter().position(|s| *s == current) {
            Some(i) => sizes[(i + 1) % sizes.len()],
            None => sizes.iter().copied().find(|s| *s > current).unwrap_or(sizes[0]),
        }
    }

    pub fn previous_page_size(&self, current: u32) -> u32 {
        let sizes = &self.list.page_sizes;
        match sizes.iter().position(|s| *s == current) {
            Some(0) | None => sizes[sizes.len() - 1],
            Some(i) => sizes[i - 1],
        }
    }
}
