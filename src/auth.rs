use reqwest::header::CONTENT_TYPE;
use tracing::{info, warn};

use crate::client::status_error;
use crate::error::{DexError, Result};
use crate::session::{SessionStore, TOKEN_KEY, USER_KEY};
use crate::types::{LoginCredentials, LoginResponse};

/// POST the credentials and persist the returned token and username.
pub async fn login(
    base_url: &str,
    store: &dyn SessionStore,
    credentials: &LoginCredentials,
) -> Result<LoginResponse> {
    let url = format!("{}/api/auth/login", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    let response = client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(credentials)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(%status, "login request rejected");
        return Err(status_error(status, || "Login endpoint not found.".to_string()));
    }

    let body: LoginResponse = response
        .json()
        .await
        .map_err(|e| DexError::Decode(e.to_string()))?;

    let token = match (body.success, body.token.as_deref()) {
        (true, Some(token)) if !token.is_empty() => token.to_string(),
        _ => {
            return Err(DexError::Auth(
                body.message.clone().unwrap_or_else(|| "invalid credentials".to_string()),
            ))
        }
    };

    store.set(TOKEN_KEY, &token)?;
    let username = body
        .user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| credentials.username.clone());
    store.set(USER_KEY, &username)?;
    let user_id = body.user.as_ref().and_then(|u| u.id.as_ref());
    info!(user = %username, id = ?user_id, "logged in");

    Ok(body)
}

pub fn logout(store: &dyn SessionStore) -> Result<()> {
    store.remove(TOKEN_KEY)?;
    store.remove(USER_KEY)?;
    Ok(())
}
