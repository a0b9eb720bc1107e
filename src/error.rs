//! Error types for provider operations.

use thiserror::Error;

use crate::schema::Diagnostic;
use crate::sonarr::ClientError;

/// Errors that can occur while serving provider requests.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object was not found.
    #[error("{summary}: {detail}")]
    NotFound {
        /// Diagnostic summary, e.g. "Series not found".
        summary: String,
        /// What was looked for.
        detail: String,
    },

    /// Input did not match what the operation expects.
    #[error("{summary}: {detail}")]
    Invalid {
        /// Diagnostic summary, e.g. "Error parsing series ID".
        summary: String,
        /// Why the input was rejected.
        detail: String,
    },

    /// A resource or data source was used before `Configure` succeeded.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Operation not supported by this resource type.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// A call to the Sonarr API failed.
    #[error("{context}: {source}")]
    Client {
        /// What the provider was doing, e.g. "Error creating series".
        context: String,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// A not-found error with its own diagnostic summary.
    pub fn not_found(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// An invalid-input error with its own diagnostic summary.
    pub fn invalid(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Invalid {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Build a closure wrapping a [`ClientError`] with context, for `map_err`.
    ///
    /// ```
    /// use sonarr_provider::ProviderError;
    /// use sonarr_provider::sonarr::ClientError;
    ///
    /// let err = ProviderError::client("Error creating series")(ClientError::Api {
    ///     status: 400,
    ///     body: "bad".to_string(),
    /// });
    /// assert_eq!(err.to_string(), "Error creating series: API error: 400 - bad");
    /// ```
    pub fn client(context: impl Into<String>) -> impl FnOnce(ClientError) -> Self {
        let context = context.into();
        move |source| Self::Client { context, source }
    }

    /// Get the error message without its category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { detail, .. } | Self::Invalid { detail, .. } => detail.clone(),
            Self::NotConfigured(msg) | Self::UnknownResource(msg) | Self::Unimplemented(msg) => {
                msg.clone()
            }
            Self::Client { source, .. } => source.to_string(),
            Self::Serialization(err) => err.to_string(),
        }
    }

    /// A short label for the error: the kind, or what failed.
    pub fn summary(&self) -> &str {
        match self {
            Self::NotFound { summary, .. } | Self::Invalid { summary, .. } => summary,
            Self::NotConfigured(_) => "Provider not configured",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Unimplemented(_) => "Unimplemented",
            Self::Client { context, .. } => context,
            Self::Serialization(_) => "Serialization error",
        }
    }

    /// Render the error as an error diagnostic with [`summary`](Self::summary)
    /// as summary and [`message`](Self::message) as detail.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.message())
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { summary, detail } => {
                tonic::Status::not_found(format!("{}: {}", summary, detail))
            }
            ProviderError::Invalid { summary, detail } => {
                tonic::Status::invalid_argument(format!("{}: {}", summary, detail))
            }
            ProviderError::NotConfigured(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Unimplemented(msg) => tonic::Status::unimplemented(msg),
            ProviderError::Client { context, source } => {
                let message = format!("{}: {}", context, source);
                match source.status() {
                    Some(401) | Some(403) => tonic::Status::permission_denied(message),
                    Some(404) => tonic::Status::not_found(message),
                    Some(status) if status >= 500 => tonic::Status::unavailable(message),
                    Some(_) => tonic::Status::invalid_argument(message),
                    None => tonic::Status::unavailable(message),
                }
            }
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            }
        }
    }
}
