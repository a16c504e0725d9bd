//! The custom-resource handler: one branch, one provider call, one callback.

use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

use crate::error::HandlerError;
use crate::event::{LifecycleEvent, RequestType, ResourceProperties};
use crate::invalidation::{InvalidationRequest, Invalidator};
use crate::response::{ResponseEnvelope, ResponseSender, Status};

/// The parts of the Lambda execution context the handler looks at.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub aws_request_id: String,
    pub log_stream_name: String,
}

impl InvocationContext {
    fn reason(&self) -> String {
        format!("See the details in CloudWatch Log Stream: {}", self.log_stream_name)
    }
}

pub struct InvalidationHandler {
    invalidator: Arc<dyn Invalidator>,
    sender: Arc<dyn ResponseSender>,
}

impl InvalidationHandler {
    pub fn new(invalidator: Arc<dyn Invalidator>, sender: Arc<dyn ResponseSender>) -> Self {
        Self { invalidator, sender }
    }

    /// Handle one lifecycle event and answer it with exactly one envelope.
    ///
    /// Configuration, provider and internal failures are reported to
    /// CloudFormation as `FAILED` and never returned. The only error returned
    /// is a failed delivery of the envelope itself.
    pub async fn handle(
        &self,
        event: &LifecycleEvent,
        context: &InvocationContext,
    ) -> Result<(), HandlerError> {
        let span = info_span!(
            "custom_resource",
            request_type = event.request_type.as_str(),
            logical_resource_id = %event.logical_resource_id,
            stack_id = %event.stack_id,
            request_id = %event.request_id,
            aws_request_id = %context.aws_request_id,
        );

        async move {
            info!(
                resource_type = %event.resource_type,
                physical_resource_id = ?event.physical_resource_id,
                properties = ?event.resource_properties,
                "received lifecycle event"
            );

            let status = match self.apply(event).await {
                Ok(()) => Status::Success,
                Err(err) => {
                    error!(error_kind = err.kind(), error = %err, "invalidation failed");
                    Status::Failed
                }
            };

            let envelope = ResponseEnvelope::new(event, status, context.reason());
            if let Err(err) = self.sender.send(&event.response_url, &envelope).await {
                error!(error_kind = err.kind(), error = %err, status = ?status, "could not deliver response");
                return Err(err);
            }

            info!(
                status = ?status,
                physical_resource_id = %envelope.physical_resource_id,
                "response delivered"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Everything that can fail on the way to a `SUCCESS` envelope.
    async fn apply(&self, event: &LifecycleEvent) -> Result<(), HandlerError> {
        if event.request_type == RequestType::Delete {
            info!("nothing to invalidate on delete");
            return Ok(());
        }

        let properties = ResourceProperties::from_value(event.resource_properties.as_ref())?;
        let distribution_id = properties.distribution_id()?;
        let paths = properties.resolve_paths()?;

        let request = InvalidationRequest::new(distribution_id, paths);
        info!(
            distribution_id = %request.distribution_id,
            paths = ?request.paths,
            caller_reference = %request.caller_reference,
            "submitting invalidation"
        );

        let receipt = self.invalidator.create_invalidation(&request).await?;
        info!(
            invalidation_id = %receipt.invalidation_id,
            status = %receipt.status,
            location = ?receipt.location,
            "invalidation accepted"
        );
        Ok(())
    }
}
