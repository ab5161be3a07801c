use std::time::Duration;

use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

static DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("sca_dispatch_total", "Dispatches by envelope outcome"),
        &["outcome"],
    )
    .expect("dispatch counter")
});

static DISPATCH_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("sca_dispatch_seconds", "Dispatch latency in seconds")
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["route"],
    )
    .expect("dispatch histogram")
});

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = global_registry();
        for collector in [
            Box::new(DISPATCH_TOTAL.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(DISPATCH_SECONDS.clone()),
        ] {
            if let Err(err) = registry.register(collector) {
                error!(?err, "failed to register dispatch metric");
            }
        }
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// `outcome` is the envelope kind, `route` the dispatcher branch.
pub fn observe_dispatch(outcome: &str, route: &str, elapsed: Duration) {
    register_metrics();
    DISPATCH_TOTAL.with_label_values(&[outcome]).inc();
    DISPATCH_SECONDS
        .with_label_values(&[route])
        .observe(elapsed.as_secs_f64());
}

/// Prometheus text exposition of the global registry.
pub fn render() -> Result<(String, String), String> {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&global_registry().gather(), &mut buffer)
        .map_err(|err| format!("metric encode error: {err}"))?;
    let body = String::from_utf8(buffer).map_err(|err| format!("metric encode error: {err}"))?;
    Ok((encoder.format_type().to_string(), body))
}
