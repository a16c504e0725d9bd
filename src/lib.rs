//! CloudFormation custom resource that invalidates a CloudFront distribution.
//!
//! On `Create` and `Update` the handler submits one `CreateInvalidation`
//! request and reports the outcome to CloudFormation through the pre-signed
//! response URL. `Delete` is acknowledged without touching CloudFront.

pub mod aws_client;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod invalidation;
pub mod log;
pub mod response;

#[cfg(test)]
mod test_support;

pub use config::HandlerConfig;
pub use error::HandlerError;
pub use event::{LifecycleEvent, RequestType, ResourceProperties};
pub use handler::{InvalidationHandler, InvocationContext};
pub use invalidation::{CloudFrontInvalidator, InvalidationRequest, Invalidator};
pub use response::{HttpResponseSender, ResponseEnvelope, ResponseSender, Status};
