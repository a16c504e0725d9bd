//! Error taxonomy for a single custom-resource invocation.
//!
//! Every variant except [`HandlerError::Callback`] is absorbed at the handler
//! boundary and reported to CloudFormation as `FAILED`. The kinds only exist so
//! the logs say which side was at fault.

/// Errors raised while handling one lifecycle event.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A required resource property is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// CloudFront rejected the invalidation, or the call to it failed.
    #[error("provider error for distribution {distribution_id}: {message}")]
    Provider {
        /// Distribution the request was addressed to.
        distribution_id: String,
        /// Full error chain as rendered by the SDK.
        message: String,
    },
    /// Anything unanticipated.
    #[error("internal error: {0}")]
    Internal(String),
    /// The response envelope could not be delivered to the pre-signed URL.
    #[error("callback delivery failed: {0}")]
    Callback(String),
}

impl HandlerError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Configuration(_) => "ConfigurationError",
            HandlerError::Provider { .. } => "ProviderError",
            HandlerError::Internal(_) => "InternalError",
            HandlerError::Callback(_) => "CallbackError",
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Internal(format!("failed to serialize JSON: {}", err))
    }
}
