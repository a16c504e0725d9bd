//! Response envelope and its delivery to the pre-signed response URL.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::event::LifecycleEvent;

pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failed,
}

/// Body PUT back to CloudFormation. One per invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    pub status: Status,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    /// Build an envelope answering `event`, with a freshly generated
    /// physical resource id and an empty data payload.
    pub fn new(event: &LifecycleEvent, status: Status, reason: String) -> Self {
        Self {
            status,
            reason,
            physical_resource_id: Uuid::new_v4().to_string(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: Map::new(),
        }
    }
}

/// Capability: deliver a response envelope to the orchestrator.
#[async_trait]
pub trait ResponseSender: Send + Sync {
    async fn send(&self, response_url: &Url, envelope: &ResponseEnvelope) -> Result<(), HandlerError>;
}

/// [`ResponseSender`] that PUTs the envelope to the pre-signed S3 URL.
#[derive(Clone)]
pub struct HttpResponseSender {
    client: reqwest::Client,
}

impl HttpResponseSender {
    pub fn new(timeout: Duration) -> Result<Self, HandlerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HandlerError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseSender for HttpResponseSender {
    async fn send(&self, response_url: &Url, envelope: &ResponseEnvelope) -> Result<(), HandlerError> {
        let body = serde_json::to_vec(envelope)?;

        // The URL is signed without a content type, so none may be sent.
        let response = self
            .client
            .put(response_url.clone())
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| HandlerError::Callback(format!("PUT to response URL failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Callback(format!(
                "response URL answered {}",
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::test_support::serve_once;

    fn event(response_url: &str) -> LifecycleEvent {
        serde_json::from_value(json!({
            "RequestType": "Update",
            "ResponseURL": response_url,
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/site/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "Invalidate",
            "PhysicalResourceId": "old-id",
            "ResourceProperties": { "DistributionId": "E1" }
        }))
        .unwrap()
    }

    #[test]
    fn test_envelope_wire_format() {
        let envelope = ResponseEnvelope::new(
            &event("https://example.com/r"),
            Status::Success,
            "See the details in CloudWatch Log Stream: stream".to_string(),
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["Status"], "SUCCESS");
        assert_eq!(value["Reason"], "See the details in CloudWatch Log Stream: stream");
        assert_eq!(value["StackId"], "arn:aws:cloudformation:us-east-1:123456789012:stack/site/guid");
        assert_eq!(value["RequestId"], "req-1");
        assert_eq!(value["LogicalResourceId"], "Invalidate");
        assert_eq!(value["NoEcho"], false);
        assert_eq!(value["Data"], json!({}));
        assert!(Uuid::parse_str(value["PhysicalResourceId"].as_str().unwrap()).is_ok());

        let failed = serde_json::to_value(Status::Failed).unwrap();
        assert_eq!(failed, "FAILED");
    }

    #[test]
    fn test_physical_resource_id_is_fresh() {
        let event = event("https://example.com/r");
        let a = ResponseEnvelope::new(&event, Status::Success, String::new());
        let b = ResponseEnvelope::new(&event, Status::Success, String::new());
        assert_ne!(a.physical_resource_id, b.physical_resource_id);
        assert_ne!(a.physical_resource_id, "old-id");
    }

    async fn one_shot_server(status_line: &str) -> (Url, tokio::task::JoinHandle<String>) {
        let (addr, handle) = serve_once(status_line, &[], "").await;
        let url = Url::parse(&format!("http://{}/signed?X-Amz-Signature=abc", addr)).unwrap();
        (url, handle)
    }

    #[tokio::test]
    async fn test_http_sender_puts_envelope() {
        let (url, server) = one_shot_server("HTTP/1.1 200 OK").await;
        let sender = HttpResponseSender::new(Duration::from_secs(5)).unwrap();
        let envelope = ResponseEnvelope::new(&event(url.as_str()), Status::Failed, "boom".to_string());

        sender.send(&url, &envelope).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.starts_with("PUT /signed?X-Amz-Signature=abc HTTP/1.1\r\n"));
        let lower = raw.to_lowercase();
        assert!(lower.contains("content-type: \r\n"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let sent: Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["Status"], "FAILED");
        assert_eq!(sent["Reason"], "boom");
    }

    #[tokio::test]
    async fn test_http_sender_rejects_error_status() {
        let (url, server) = one_shot_server("HTTP/1.1 403 Forbidden").await;
        let sender = HttpResponseSender::new(Duration::from_secs(5)).unwrap();
        let envelope = ResponseEnvelope::new(&event(url.as_str()), Status::Success, String::new());

        let err = sender.send(&url, &envelope).await.unwrap_err();
        assert_eq!(err.kind(), "CallbackError");
        server.await.unwrap();
    }
}
