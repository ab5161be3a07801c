use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use supplychain_core_types::{QueryRequest, ResponseEnvelope};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, warn};

use super::state::ServeState;
use crate::metrics;

/// `POST /query/` body. The `user_input`/`user_role` names are accepted for
/// existing front-ends.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(alias = "user_input")]
    pub text: String,
    #[serde(alias = "user_role")]
    pub role: String,
    pub region: String,
}

pub fn build_router(state: ServeState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/query/", post(query_handler))
        .route("/query", post(query_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, ?err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn query_handler(
    State(state): State<ServeState>,
    Json(body): Json<QueryBody>,
) -> Json<ResponseEnvelope> {
    let request = QueryRequest::new(body.text, &body.role, body.region);
    let started = Instant::now();
    let report = state.dispatcher.dispatch(&request).await;
    metrics::observe_dispatch(
        report.envelope.kind(),
        report.intent.route().as_str(),
        started.elapsed(),
    );
    Json(report.envelope)
}

async fn health_handler(State(state): State<ServeState>) -> Json<Value> {
    let snapshot = state.policies.snapshot();
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime_secs(),
        "policy_rev": snapshot.rev,
        "intent_rules": state.dispatcher.classifier().rules().len(),
    }))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::render() {
        Ok((content_type, body)) => match HeaderValue::from_str(&content_type) {
            Ok(value) => ([(header::CONTENT_TYPE, value)], body).into_response(),
            Err(err) => {
                error!(?err, "failed to build content-type header for metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
            }
        },
        Err(err) => {
            error!(%err, "failed to encode prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}
