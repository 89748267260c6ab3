use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use log::error;

use crate::integration;
use crate::state::AppState;

mod handler;
pub mod model;
pub mod service;

use model::Reply;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<service::WebhookService>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/crisp/v1/webhook", post(handler::receive))
        .route("/crisp/v1/webhook/", post(handler::receive))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub fn health<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(handler::health))
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid data")]
    InvalidData,
    #[error("Session ID is required")]
    MissingSessionId,

    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

impl From<Error> for Reply {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidData | Error::_ParseJson(_) => {
                Reply::error(StatusCode::BAD_REQUEST, "Invalid data")
            }
            Error::MissingSessionId => {
                Reply::error(StatusCode::BAD_REQUEST, "Session ID is required")
            }
            Error::_Integration(e) => {
                error!("API request failed: {e}");
                Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "API request failed")
            }
        }
    }
}
