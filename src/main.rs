use std::sync::Arc;

use cloudfront_invalidate::aws_client::build_cloudfront_client;
use cloudfront_invalidate::log::log_init;
use cloudfront_invalidate::{
    CloudFrontInvalidator, HandlerConfig, HttpResponseSender, InvalidationHandler,
    InvocationContext, LifecycleEvent,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = HandlerConfig::from_env()?;
    log_init(config.log_format);

    let client = build_cloudfront_client(&config).await;
    let invalidator = Arc::new(CloudFrontInvalidator::new(client, config.invalidation_timeout));
    let sender = Arc::new(HttpResponseSender::new(config.callback_timeout)?);
    let handler = Arc::new(InvalidationHandler::new(invalidator, sender));

    info!(
        region = %config.region,
        endpoint_url = ?config.endpoint_url,
        "cloudfront invalidation handler ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<LifecycleEvent>| {
        let handler = Arc::clone(&handler);
        async move {
            let context = InvocationContext {
                aws_request_id: event.context.request_id.clone(),
                log_stream_name: event.context.env_config.log_stream.clone(),
            };
            handler
                .handle(&event.payload, &context)
                .await
                .map_err(Error::from)
        }
    }))
    .await
}
