//! CloudFormation custom-resource request model.
//!
//! The request arrives as PascalCase JSON. Resource properties are kept as raw
//! JSON on [`LifecycleEvent`] and only parsed into [`ResourceProperties`] on the
//! Create/Update path, so a missing, null or malformed property set can still
//! be answered with `FAILED` instead of failing the invocation outright.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::HandlerError;

/// Path pattern used when the caller supplies none.
pub const DEFAULT_INVALIDATION_PATH: &str = "/*";

/// Lifecycle stage CloudFormation is driving the resource through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        }
    }
}

/// Custom resource request as delivered by CloudFormation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    /// Pre-signed S3 URL the response envelope is PUT to.
    #[serde(rename = "ResponseURL")]
    pub response_url: Url,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    /// Present on Update and Delete.
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Option<Value>,
    /// Present on Update.
    #[serde(default)]
    pub old_resource_properties: Option<Value>,
}

/// `InvalidationPaths` as it may appear on the wire.
///
/// Templates can pass a list, but the infrastructure construct that owns this
/// resource joins its list with commas before handing it over.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathList {
    Items(Vec<String>),
    Joined(String),
}

/// Properties this resource understands. `ServiceToken` and anything else
/// CloudFormation adds are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default)]
    pub distribution_id: Option<String>,
    #[serde(default)]
    pub invalidation_paths: Option<PathList>,
    #[serde(default)]
    pub object_path: Option<String>,
}

impl ResourceProperties {
    /// Parse the raw properties of an event. Absent or `null` properties parse
    /// as empty; anything other than an object is malformed.
    pub fn from_value(properties: Option<&Value>) -> Result<Self, HandlerError> {
        match properties {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).map_err(|e| {
                HandlerError::Configuration(format!("malformed resource properties: {}", e))
            }),
            Some(other) => Err(HandlerError::Configuration(format!(
                "ResourceProperties must be an object, got {}",
                other
            ))),
        }
    }

    /// The target distribution, passed to CloudFront exactly as given.
    pub fn distribution_id(&self) -> Result<&str, HandlerError> {
        match self.distribution_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(HandlerError::Configuration(
                "missing required property DistributionId".to_string(),
            )),
        }
    }

    /// Resolve the ordered path list.
    ///
    /// `InvalidationPaths` wins over `ObjectPath`, which wins over the `/*`
    /// default. Comma-joined strings are split without reordering.
    pub fn resolve_paths(&self) -> Result<Vec<String>, HandlerError> {
        let paths = match (&self.invalidation_paths, &self.object_path) {
            (Some(PathList::Items(items)), _) => items.clone(),
            (Some(PathList::Joined(joined)), _) => split_paths(joined),
            (None, Some(object_path)) => split_paths(object_path),
            (None, None) => vec![DEFAULT_INVALIDATION_PATH.to_string()],
        };

        if paths.is_empty() {
            return Err(HandlerError::Configuration(
                "InvalidationPaths must contain at least one path".to_string(),
            ));
        }
        Ok(paths)
    }
}

fn split_paths(joined: &str) -> Vec<String> {
    joined.split(',').map(String::from).collect()
}
