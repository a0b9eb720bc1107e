//! Errors returned by the Sonarr HTTP client.

use thiserror::Error;

/// Result type alias for Sonarr client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to a Sonarr instance.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL could not be used to build endpoint URLs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The client was built without a required setting.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// The request could not be sent or the response could not be received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Sonarr answered with an unexpected status code.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// The HTTP status code, if this error came from an API response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 400,
            body: "Path is already configured".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - Path is already configured");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
        assert_eq!(err.status(), None);
    }
}
