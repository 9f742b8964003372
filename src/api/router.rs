use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::api::cors::add_cors_headers;
use crate::api::handlers::{method_not_allowed, preflight, validate_vat};
use crate::api::state::AppState;
use crate::config::VALIDATE_PATH;

pub fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &axum::http::Request<_>| {
            tracing::info_span!("http_request", method = %req.method(), uri = %req.uri())
        })
        .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            tower_http::trace::DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        );

    let router = Router::new().route(
        VALIDATE_PATH,
        post(validate_vat)
            .options(preflight)
            .fallback(method_not_allowed),
    );

    add_cors_headers(router.layer(trace)).with_state(state)
}
