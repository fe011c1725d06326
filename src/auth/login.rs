// Credential login against the Nacos auth endpoint

use chrono::Utc;
use reqwest::Client;

use super::types::{LoginResponse, SessionToken};
use crate::error::{NacosError, Result};

/// Path suffix every Nacos server address ends with
const SERVICE_PATH_SUFFIX: &str = "/nacos";

/// Login endpoint, relative to the normalized address
const LOGIN_PATH: &str = "/v1/auth/login";

/// Make sure the address ends with `/nacos`. Idempotent.
pub fn normalize_addr(addr: &str) -> String {
    if addr.ends_with(SERVICE_PATH_SUFFIX) {
        addr.to_string()
    } else if addr.ends_with('/') {
        format!("{}{}", addr, &SERVICE_PATH_SUFFIX[1..])
    } else {
        format!("{}{}", addr, SERVICE_PATH_SUFFIX)
    }
}

/// Login URL for a server address
pub fn login_url(addr: &str) -> String {
    format!("{}{}", normalize_addr(addr), LOGIN_PATH)
}

/// Absolute expiry for a server-supplied TTL; clamps instead of overflowing
fn expire_at(now: i64, token_ttl: i64) -> i64 {
    now.saturating_add(token_ttl)
}

/// Exchanges username/password for a session token
#[derive(Clone)]
pub struct Authenticator {
    client: Client,
}

impl Authenticator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Log in and return a token stamped with its absolute expiry
    pub async fn login(&self, addr: &str, username: &str, password: &str) -> Result<SessionToken> {
        if addr.is_empty() {
            return Err(NacosError::Validation("address is required".to_string()));
        }
        if username.is_empty() {
            return Err(NacosError::Validation("username is required".to_string()));
        }
        if password.is_empty() {
            return Err(NacosError::Validation("password is required".to_string()));
        }

        let url = login_url(addr);
        tracing::info!(url = %url, username = %username, "Logging in to Nacos");

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| NacosError::AuthenticationFailed(format!("login request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NacosError::AuthenticationFailed(format!("failed to read login response: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Login rejected");
            return Err(NacosError::AuthenticationFailed(format!(
                "status code {}, response: {}",
                status.as_u16(),
                NacosError::truncate_body(&body)
            )));
        }

        let data: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            NacosError::AuthenticationFailed(format!("failed to parse login response: {}", e))
        })?;

        if data.access_token.is_empty() {
            return Err(NacosError::AuthenticationFailed(
                "login response does not contain accessToken".to_string(),
            ));
        }

        let expire_time = expire_at(Utc::now().timestamp(), data.token_ttl);
        tracing::debug!(
            token_ttl = data.token_ttl,
            expire_time = expire_time,
            "Login successful"
        );

        Ok(SessionToken {
            access_token: data.access_token,
            expire_time,
            username: Some(username.to_string()),
        })
    }
}
