//! Runtime configuration, read once at cold start.

use aws_types::region::Region;
use std::fmt;
use std::time::Duration;

use crate::error::HandlerError;
use crate::invalidation::DEFAULT_INVALIDATION_TIMEOUT_SECS;
use crate::response::DEFAULT_CALLBACK_TIMEOUT_SECS;

/// CloudFront is a global service signed in us-east-1.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Static keys used against an endpoint override, where the Lambda execution
/// role does not apply.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for EndpointCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub region: Region,
    /// Endpoint override, e.g. LocalStack.
    pub endpoint_url: Option<String>,
    /// Required whenever `endpoint_url` is set.
    pub endpoint_credentials: Option<EndpointCredentials>,
    pub invalidation_timeout: Duration,
    pub callback_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            region: Region::new(DEFAULT_REGION),
            endpoint_url: None,
            endpoint_credentials: None,
            invalidation_timeout: Duration::from_secs(DEFAULT_INVALIDATION_TIMEOUT_SECS),
            callback_timeout: Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, HandlerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset and blank values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HandlerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(region) = get("AWS_REGION") {
            config.region = Region::new(region);
        }
        config.endpoint_url = get("CLOUDFRONT_ENDPOINT_URL");
        if config.endpoint_url.is_some() {
            match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
                (Some(access_key_id), Some(secret_access_key)) => {
                    config.endpoint_credentials = Some(EndpointCredentials {
                        access_key_id,
                        secret_access_key,
                        session_token: get("AWS_SESSION_TOKEN"),
                    });
                }
                _ => {
                    return Err(HandlerError::Configuration(
                        "CLOUDFRONT_ENDPOINT_URL requires AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
                            .to_string(),
                    ))
                }
            }
        }
        if let Some(raw) = get("INVALIDATION_TIMEOUT_SECS") {
            config.invalidation_timeout = parse_secs("INVALIDATION_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("CALLBACK_TIMEOUT_SECS") {
            config.callback_timeout = parse_secs("CALLBACK_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = match raw.trim().to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => {
                    return Err(HandlerError::Configuration(format!(
                        "LOG_FORMAT must be text or json, got {}",
                        other
                    )))
                }
            };
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, HandlerError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(HandlerError::Configuration(format!(
            "{} must be a positive number of seconds, got {}",
            key, raw
        ))),
    }
}
