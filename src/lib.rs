use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod integration;
pub mod state;
pub mod webhook;

use state::AppState;

pub fn app(state: AppState) -> integration::Result<Router> {
    let env = &state.config.env;
    let cors = CorsLayer::new()
        .allow_origin(env.allow_origin()?)
        .allow_methods(env.allow_methods())
        .allow_headers(env.allow_headers());

    // No tracing subscriber is installed; the `log` feature of tracing routes
    // these events into the simplelog logger.
    let trace = TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Ok(Router::new()
        .merge(webhook::api(state.clone()))
        .merge(webhook::health())
        .layer(cors)
        .layer(trace))
}
