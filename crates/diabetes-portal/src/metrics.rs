use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::warn;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static AUTH_EVENTS: OnceLock<IntCounterVec> = OnceLock::new();
static PREDICTIONS: OnceLock<IntCounterVec> = OnceLock::new();
static DATASET_FETCHES: OnceLock<IntCounterVec> = OnceLock::new();
static TRAINING_SECONDS: OnceLock<Histogram> = OnceLock::new();

/// Create and register the collectors. Safe to call more than once.
pub fn init_metrics() {
    if let Ok(counter) = IntCounterVec::new(
        prometheus::opts!("auth_events_total", "Signup and login attempts by outcome"),
        &["event", "outcome"],
    ) {
        register(AUTH_EVENTS.get_or_init(|| counter).clone());
    }

    if let Ok(counter) = IntCounterVec::new(
        prometheus::opts!("predictions_total", "Predictions served by predicted class"),
        &["class"],
    ) {
        register(PREDICTIONS.get_or_init(|| counter).clone());
    }

    if let Ok(counter) = IntCounterVec::new(
        prometheus::opts!("dataset_fetch_total", "Reference dataset downloads by outcome"),
        &["outcome"],
    ) {
        register(DATASET_FETCHES.get_or_init(|| counter).clone());
    }

    if let Ok(histogram) = Histogram::with_opts(
        HistogramOpts::new("model_training_seconds", "Time spent fitting the per-session model")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    ) {
        register(TRAINING_SECONDS.get_or_init(|| histogram).clone());
    }
}

fn register<C>(collector: C)
where
    C: prometheus::core::Collector + 'static,
{
    // AlreadyReg on repeated init is expected.
    REGISTRY.register(Box::new(collector)).ok();
}

pub fn inc_auth_event(event: &str, outcome: &str) {
    if let Some(counter) = AUTH_EVENTS.get() {
        counter.with_label_values(&[event, outcome]).inc();
    }
}

pub fn inc_prediction(class: &str) {
    if let Some(counter) = PREDICTIONS.get() {
        counter.with_label_values(&[class]).inc();
    }
}

/// Predictions served so far for `class`; zero before `init_metrics`.
pub fn prediction_count(class: &str) -> u64 {
    PREDICTIONS
        .get()
        .map(|counter| counter.with_label_values(&[class]).get())
        .unwrap_or(0)
}

pub fn inc_dataset_fetch(outcome: &str) {
    if let Some(counter) = DATASET_FETCHES.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn observe_training(seconds: f64) {
    if let Some(histogram) = TRAINING_SECONDS.get() {
        histogram.observe(seconds);
    }
}

/// Prometheus text exposition of every registered collector.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(feature = "server")]
pub async fn get_metrics() -> impl axum::response::IntoResponse {
    (
        axum::http::StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        render(),
    )
}
