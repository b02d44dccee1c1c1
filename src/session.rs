use std::path::PathBuf;
use std::sync::Arc;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Persistent key-value store holding the login session.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;
    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// One file per key: ~/.config/dexview/session/{key}
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_location() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        Some(Self::new(config_dir.join("dexview").join("session")))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key.replace(['/', '\\'], "_"))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let value = std::fs::read_to_string(self.path(key)).ok()?;
        let value = value.trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Supplies the bearer token for each API request.
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    fn token(&self) -> Option<String>;
}

/// Reads the token from the session store at the start of every request.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    store: Arc<dyn SessionStore>,
}

impl StoredCredential {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl CredentialProvider for StoredCredential {
    fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }
}

/// A token supplied up front (`--token` / `DEXVIEW_TOKEN`).
#[derive(Clone)]
pub struct StaticCredential(pub String);

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticCredential").field(&"***").finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn token(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

/// Route guard: the catalog screens need a stored session.
pub fn is_authenticated(credentials: &dyn CredentialProvider) -> bool {
    credentials.token().is_some()
}
