use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::error::{NacosError, Result};

/// Fully-read HTTP response handed to response interpreters
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Map a non-success status to an error
    pub fn into_error(self) -> NacosError {
        NacosError::from_status(self.status.as_u16(), &self.body)
    }
}

/// HTTP client for the Nacos API with authenticated exchanges
pub struct NacosHttpClient {
    /// Shared HTTP client
    client: Client,

    /// Token source
    session: SessionManager,
}

impl NacosHttpClient {
    /// Create a new HTTP client. No timeouts are configured.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder().build()?;
        let session = SessionManager::new(config, client.clone());

        Ok(Self { client, session })
    }

    /// Execute an authenticated exchange.
    ///
    /// `build` creates the request (called once per attempt), `interpret`
    /// turns the response into a result. When `interpret` reports
    /// `AuthorizationRejected`, the cached session is invalidated, a fresh
    /// token is obtained and the request is rebuilt and sent exactly once
    /// more. Transport errors are never retried.
    pub async fn exchange<T, B, I>(&self, build: B, interpret: I) -> Result<T>
    where
        B: Fn(&Client) -> RequestBuilder,
        I: Fn(RawResponse) -> Result<T>,
    {
        let token = self.session.get_token().await?;
        let response = self.send(&build, token.as_deref(), 1).await?;

        match interpret(response) {
            Err(err) if err.is_auth_rejection() => {
                tracing::warn!("Request rejected ({}), re-authenticating and retrying once", err);

                if let Err(e) = self.session.invalidate() {
                    tracing::warn!("Failed to clear token cache: {}", e);
                }

                let token = self.session.get_token().await?;
                let response = self.send(&build, token.as_deref(), 2).await?;
                interpret(response)
            }
            other => other,
        }
    }

    async fn send<B>(&self, build: &B, token: Option<&str>, attempt: u32) -> Result<RawResponse>
    where
        B: Fn(&Client) -> RequestBuilder,
    {
        let mut request = build(&self.client);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(
            method = %method,
            url = %url,
            attempt = attempt,
            authenticated = token.is_some(),
            "Sending HTTP request"
        );

        let response = self.client.execute(request).await.map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connection_failed"
            } else if e.is_request() {
                "request_error"
            } else {
                "unknown"
            };
            tracing::debug!(error_kind = error_kind, error = %e, url = %url, "HTTP request error");
            NacosError::Transport(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!(status = %status, body_len = body.len(), "Received HTTP response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Get the session manager
    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    fn raw(status: u16, body: &str) -> RawResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain;charset=UTF-8"));
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_raw_response_header() {
        let response = raw(200, "");
        assert_eq!(
            response.header("content-type"),
            Some("text/plain;charset=UTF-8")
        );
        assert_eq!(response.header("content-md5"), None);
    }

    #[test]
    fn test_raw_response_into_error() {
        assert!(raw(401, "").into_error().is_auth_rejection());
        assert!(raw(403, "no permission").into_error().is_auth_rejection());
        assert!(matches!(
            raw(500, "boom").into_error(),
            NacosError::UnexpectedStatus { status: 500, .. }
        ));
    }
}
