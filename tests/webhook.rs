use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use crisp_relay::integration::downstream::{self, DownstreamClient, DownstreamResponse};
use crisp_relay::integration::{self, Config, Env};
use crisp_relay::state::AppState;
use crisp_relay::webhook::model::OutboundPayload;

#[derive(Default)]
struct RecordingDownstream {
    sent: Mutex<Vec<OutboundPayload>>,
}

#[async_trait]
impl DownstreamClient for RecordingDownstream {
    async fn send(&self, payload: &OutboundPayload) -> integration::Result<DownstreamResponse> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(DownstreamResponse {
            status_line: "HTTP/1.1 200 OK".to_owned(),
            headers: HeaderMap::new(),
            body: r#"{"ok":true}"#.to_owned(),
        })
    }
}

fn make_app() -> (Router, Arc<RecordingDownstream>) {
    let downstream = Arc::new(RecordingDownstream::default());
    let config = Config {
        env: Env::Local,
        downstream: downstream::Config::default(),
    };
    let state = AppState::with_downstream(config, downstream.clone());
    (crisp_relay::app(state).expect("app"), downstream)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("json");
    (status, value)
}

#[tokio::test]
async fn health_route_returns_ok() {
    let (app, _) = make_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_message_is_relayed() {
    let (app, downstream) = make_app();

    let response = app
        .oneshot(post(
            "/crisp/v1/webhook/",
            r#"{"event":"message:send","data":{"from":"user","content":"Where is my order?","session_id":"session_7f1","website_id":"site_1"}}"#,
        ))
        .await
        .expect("response");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "message_sent": "Where is my order?",
            "node_response": { "ok": true },
            "http_code": "200",
        })
    );

    let sent = downstream.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].session_id, "session_7f1");
    assert_eq!(sent[0].website_id, "site_1");
}

#[tokio::test]
async fn route_without_trailing_slash_is_served() {
    let (app, _) = make_app();

    let response = app
        .oneshot(post(
            "/crisp/v1/webhook",
            r#"{"data":{"from":"operator"}}"#,
        ))
        .await
        .expect("response");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ignored", "reason": "Message sent by operator" })
    );
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, downstream) = make_app();

    let response = app
        .oneshot(post("/crisp/v1/webhook/", "{\"data\":"))
        .await
        .expect("response");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid data" }));
    assert!(downstream.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_session_is_bad_request() {
    let (app, downstream) = make_app();

    let response = app
        .oneshot(post(
            "/crisp/v1/webhook/",
            r#"{"data":{"from":"user","content":"hi"}}"#,
        ))
        .await
        .expect("response");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Session ID is required" }));
    assert!(downstream.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn get_on_webhook_is_not_allowed() {
    let (app, _) = make_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/crisp/v1/webhook/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn large_body_is_accepted() {
    let (app, _) = make_app();
    let content = "x".repeat(3 * 1024 * 1024);
    let body = json!({ "data": { "from": "operator", "content": content } }).to_string();

    let response = app
        .oneshot(post("/crisp/v1/webhook/", &body))
        .await
        .expect("response");

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
}
