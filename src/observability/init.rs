//! Subscriber setup.

use opentelemetry::trace::TracerProvider as _;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::tracer;
use crate::infrastructure::paths::resolve_data_dir;
use crate::Config;

/// Service name recorded on every span.
pub const SERVICE_NAME: &str = "folio";

/// File name of the span log inside the data directory.
pub const SPAN_FILE_NAME: &str = "folio-spans.jsonl";

/// Installs the global subscriber writing spans to
/// `<data_dir>/folio-spans.jsonl`.
///
/// The level comes from `config.trace_level` (an `EnvFilter` directive such
/// as `"info"` or `"folio=debug"`). Returns `false` without installing
/// anything if the data directory cannot be created, and when a global
/// subscriber is already set, so repeated calls are harmless.
pub fn init_tracing(config: &Config) -> bool {
    let data_dir = resolve_data_dir(config.data_dir.as_deref());
    if std::fs::create_dir_all(&data_dir).is_err() {
        return false;
    }

    let filter = EnvFilter::try_new(&config.trace_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let provider = tracer::create_tracer_provider(data_dir.join(SPAN_FILE_NAME), SERVICE_NAME);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init()
        .is_ok()
}
