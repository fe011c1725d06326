// Authentication types

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Seconds before expiry at which a token is already treated as stale
pub const TOKEN_EXPIRE_BUFFER_SECS: i64 = 300;

/// Logical server + credential pairing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointIdentity {
    pub addr: String,
    pub api_version: String,
    pub username: Option<String>,
}

impl EndpointIdentity {
    pub fn new(addr: &str, api_version: &str, username: Option<&str>) -> Self {
        Self {
            addr: addr.to_string(),
            api_version: api_version.to_string(),
            username: username.map(str::to_string),
        }
    }

    /// Stable hex digest of `addr:username`, safe to use as a file name
    pub fn cache_key(&self) -> String {
        let material = format!("{}:{}", self.addr, self.username.as_deref().unwrap_or(""));
        format!("{:x}", Sha256::digest(material.as_bytes()))
    }
}

/// Session token as persisted in the token cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub access_token: String,

    /// Unix timestamp (seconds)
    pub expire_time: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SessionToken {
    /// Check freshness against an explicit clock
    pub fn is_fresh_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && self.expire_time > now + TOKEN_EXPIRE_BUFFER_SECS
    }

    /// Check freshness against the current time
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now().timestamp())
    }

    /// A token without an owner never matches a named identity
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.username.as_deref() == Some(username)
    }
}

/// Login response from `/v1/auth/login`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: String,

    /// Token time-to-live in seconds
    #[serde(default)]
    pub token_ttl: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token(expire_time: i64) -> SessionToken {
        SessionToken {
            access_token: "test".to_string(),
            expire_time,
            username: Some("nacos".to_string()),
        }
    }

    #[test]
    fn test_token_freshness() {
        let now = 1_700_000_000;
        assert!(token(9_999_999_999).is_fresh_at(now));
        assert!(!token(1_000_000_000).is_fresh_at(now));

        // Exactly at the buffer edge is stale
        assert!(!token(now + TOKEN_EXPIRE_BUFFER_SECS).is_fresh_at(now));
        assert!(token(now + TOKEN_EXPIRE_BUFFER_SECS + 1).is_fresh_at(now));
    }

    #[test]
    fn test_empty_token_is_never_fresh() {
        let empty = SessionToken {
            access_token: String::new(),
            expire_time: 9_999_999_999,
            username: None,
        };
        assert!(!empty.is_fresh());
    }

    #[test]
    fn test_ownership() {
        let t = token(0);
        assert!(t.is_owned_by("nacos"));
        assert!(!t.is_owned_by("admin"));

        let anonymous = SessionToken {
            username: None,
            ..token(0)
        };
        assert!(!anonymous.is_owned_by("nacos"));
    }

    #[test]
    fn test_cache_key_is_stable_and_per_user() {
        let a = EndpointIdentity::new("http://x/nacos", "v1", Some("a"));
        let a2 = EndpointIdentity::new("http://x/nacos", "v2", Some("a"));
        let b = EndpointIdentity::new("http://x/nacos", "v1", Some("b"));

        assert_eq!(a.cache_key(), a2.cache_key());
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key().len(), 64);
        assert!(a.cache_key().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_json_shape() {
        let json = serde_json::to_value(token(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"accessToken": "test", "expireTime": 42, "username": "nacos"})
        );

        let without_user: SessionToken =
            serde_json::from_str(r#"{"accessToken":"T","expireTime":7}"#).unwrap();
        assert_eq!(without_user.username, None);
        assert!(!serde_json::to_string(&without_user).unwrap().contains("username"));
    }

    #[test]
    fn test_login_response_parsing() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"accessToken":"eyJhbGci","tokenTtl":18000,"globalAdmin":true}"#,
        )
        .unwrap();
        assert_eq!(resp.access_token, "eyJhbGci");
        assert_eq!(resp.token_ttl, 18000);

        let resp: LoginResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.access_token.is_empty());
        assert_eq!(resp.token_ttl, 0);
    }

    proptest! {
        #[test]
        fn prop_freshness_boundary(now in 0i64..4_000_000_000, offset in -100_000i64..100_000) {
            let t = token(now + offset);
            prop_assert_eq!(t.is_fresh_at(now), offset > TOKEN_EXPIRE_BUFFER_SECS);
        }
    }
}
