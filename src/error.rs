// Error handling module
// Defines the error taxonomy shared by the auth layer and the config API client

use thiserror::Error;

/// Maximum length for response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Errors that can occur while talking to the Nacos server
#[derive(Error, Debug)]
pub enum NacosError {
    /// Missing or invalid input, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login rejected, or the login response carried no usable token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Config operation rejected with 401/403 after the one re-authentication
    #[error("Authorization rejected: status {status} - {body}")]
    AuthorizationRejected { status: u16, body: String },

    /// The requested config does not exist
    #[error("Config not found: dataId={data_id}, group={group}, namespace={namespace}")]
    NotFound {
        data_id: String,
        group: String,
        namespace: String,
    },

    /// Network or connection failure, never retried
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-success response
    #[error("Unexpected response: status {status} - {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local file system error (cache directory, config files, editor)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NacosError {
    /// Truncate a response body to avoid printing excessive data
    pub fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }

        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Build an error for a non-success status
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = Self::truncate_body(body);
        match status {
            401 | 403 => NacosError::AuthorizationRejected { status, body },
            _ => NacosError::UnexpectedStatus { status, body },
        }
    }

    /// Whether this error is an authorization rejection from the server
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, NacosError::AuthorizationRejected { .. })
    }
}

/// Result type alias for Nacos operations
pub type Result<T> = std::result::Result<T, NacosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NacosError::Validation("password is required".to_string());
        assert_eq!(err.to_string(), "Validation error: password is required");

        let err = NacosError::AuthenticationFailed("status 403".to_string());
        assert_eq!(err.to_string(), "Authentication failed: status 403");

        let err = NacosError::UnexpectedStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Unexpected response: status 500 - boom");
    }

    #[test]
    fn test_not_found_message() {
        let err = NacosError::NotFound {
            data_id: "app.yaml".to_string(),
            group: "DEFAULT_GROUP".to_string(),
            namespace: "public".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Config not found: dataId=app.yaml, group=DEFAULT_GROUP, namespace=public"
        );
    }

    #[test]
    fn test_from_status() {
        assert!(NacosError::from_status(401, "").is_auth_rejection());
        assert!(NacosError::from_status(403, "denied").is_auth_rejection());
        assert!(!NacosError::from_status(404, "").is_auth_rejection());

        match NacosError::from_status(500, "server down") {
            NacosError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "server down");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(NacosError::truncate_body(short), short);

        let long = "x".repeat(600);
        let truncated = NacosError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
    }

    #[test]
    fn test_truncate_body_multibyte() {
        // 3-byte characters: byte 500 is not a char boundary
        let long = "配".repeat(200);
        let truncated = NacosError::truncate_body(&long);
        assert!(truncated.contains("(truncated, 600 total bytes)"));
    }
}
