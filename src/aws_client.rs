//! CloudFront client construction.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_cloudfront::config::retry::RetryConfig;
use aws_sdk_cloudfront::config::Builder as CloudFrontConfigBuilder;
use aws_sdk_cloudfront::Client as CloudFrontClient;

use crate::config::HandlerConfig;

const ENDPOINT_CREDENTIALS_SOURCE: &str = "cloudfront-endpoint-override";

/// Build the CloudFront client described by `config`.
///
/// With an endpoint override the client signs with the static keys carried in
/// the config; otherwise credentials come from the standard chain, which on
/// Lambda is the execution role. SDK retries are off: one invocation makes one
/// attempt and a failure goes back to CloudFormation.
pub async fn build_cloudfront_client(config: &HandlerConfig) -> CloudFrontClient {
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(config.region.clone());
    if let Some(keys) = &config.endpoint_credentials {
        loader = loader.credentials_provider(Credentials::new(
            keys.access_key_id.clone(),
            keys.secret_access_key.clone(),
            keys.session_token.clone(),
            None,
            ENDPOINT_CREDENTIALS_SOURCE,
        ));
    }
    let sdk_config = loader.load().await;

    let mut builder = CloudFrontConfigBuilder::from(&sdk_config).retry_config(RetryConfig::disabled());
    if let Some(url) = &config.endpoint_url {
        builder = builder.endpoint_url(url.clone());
    }
    CloudFrontClient::from_conf(builder.build())
}
