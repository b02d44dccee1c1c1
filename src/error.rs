use thiserror::Error;

#[derive(Error, Debug)]
pub enum DexError {
    #[error("No authentication token found. Please login first.")]
    Unauthenticated,

    #[error("Unauthorized. Please login again.")]
    Unauthorized,

    #[error("Access forbidden. You do not have permission to access this resource.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("HTTP error! status: {0}")]
    Http(u16),

    #[error("{0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_the_banner_shows() {
        assert_eq!(
            DexError::Unauthenticated.to_string(),
            "No authentication token found. Please login first."
        );
        assert_eq!(DexError::Http(500).to_string(), "HTTP error! status: 500");
        assert_eq!(
            DexError::NotFound("Pokemon \"zzz\" not found".into()).to_string(),
            "Pokemon \"zzz\" not found"
        );
    }
}
