use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use super::model::Reply;
use crate::webhook;

pub async fn receive(webhook_service: State<webhook::Service>, body: Bytes) -> Reply {
    webhook_service.handle_webhook(&body).await
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
