use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "info";

/// Install the process subscriber. Called once from `main`; the handler only
/// emits events.
///
/// CloudWatch timestamps every line, so ours are left out, as are colours.
pub fn log_init(format: LogFormat) {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    let base = fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_target(false);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(base).init(),
        LogFormat::Json => registry
            .with(base.json().flatten_event(true).with_current_span(true))
            .init(),
    }
}

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
