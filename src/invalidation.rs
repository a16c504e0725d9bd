//! Invalidation requests and the CloudFront client that submits them.

use async_trait::async_trait;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_cloudfront::Client as CloudFrontClient;
use std::time::Duration;
use uuid::Uuid;

use crate::error::HandlerError;

pub const DEFAULT_INVALIDATION_TIMEOUT_SECS: u64 = 30;

/// One invalidation attempt. Lives only for the duration of the API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub paths: Vec<String>,
    pub caller_reference: String,
}

impl InvalidationRequest {
    /// Build a request with a fresh caller reference.
    pub fn new(distribution_id: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            paths,
            caller_reference: new_caller_reference(),
        }
    }
}

/// Time-derived uniqueness token.
///
/// A UUIDv7 leads with the millisecond timestamp and fills the rest with
/// random bits, so CloudFront never treats a retried deploy as a duplicate.
pub fn new_caller_reference() -> String {
    Uuid::now_v7().to_string()
}

/// What CloudFront reported when it queued the invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReceipt {
    pub invalidation_id: String,
    pub status: String,
    pub location: Option<String>,
}

/// Capability: submit an invalidation request to the CDN provider.
#[async_trait]
pub trait Invalidator: Send + Sync {
    /// Returns once the provider has accepted the request, not when the
    /// invalidation has completed.
    async fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt, HandlerError>;
}

/// [`Invalidator`] backed by the CloudFront `CreateInvalidation` API.
#[derive(Clone)]
pub struct CloudFrontInvalidator {
    client: CloudFrontClient,
    timeout: Duration,
}

impl CloudFrontInvalidator {
    pub fn new(client: CloudFrontClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Invalidator for CloudFrontInvalidator {
    async fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt, HandlerError> {
        let batch = build_batch(request)?;

        let send_future = self
            .client
            .create_invalidation()
            .distribution_id(&request.distribution_id)
            .invalidation_batch(batch)
            .send();

        let output = tokio::time::timeout(self.timeout, send_future)
            .await
            .map_err(|_| HandlerError::Provider {
                distribution_id: request.distribution_id.clone(),
                message: format!(
                    "CreateInvalidation timed out after {}s",
                    self.timeout.as_secs()
                ),
            })?
            .map_err(|e| HandlerError::Provider {
                distribution_id: request.distribution_id.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let invalidation = output.invalidation().ok_or_else(|| {
            HandlerError::Internal("CreateInvalidation response carried no invalidation".to_string())
        })?;

        Ok(InvalidationReceipt {
            invalidation_id: invalidation.id().to_string(),
            status: invalidation.status().to_string(),
            location: output.location().map(String::from),
        })
    }
}

/// Translate a request into the SDK's batch shape; `Quantity` must match the
/// item count.
fn build_batch(request: &InvalidationRequest) -> Result<InvalidationBatch, HandlerError> {
    let quantity = i32::try_from(request.paths.len())
        .map_err(|_| HandlerError::Internal("too many invalidation paths".to_string()))?;

    let paths = Paths::builder()
        .quantity(quantity)
        .set_items(Some(request.paths.clone()))
        .build()
        .map_err(|e| HandlerError::Internal(format!("failed to build Paths: {}", e)))?;

    InvalidationBatch::builder()
        .paths(paths)
        .caller_reference(&request.caller_reference)
        .build()
        .map_err(|e| HandlerError::Internal(format!("failed to build InvalidationBatch: {}", e)))
}
