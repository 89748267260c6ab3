use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;

use super::model::{InboundEvent, OutboundPayload, Outcome, Reply, UNKNOWN_HTTP_CODE};
use crate::integration::downstream::{self, DownstreamResponse};
use crate::webhook;

static STATUS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HTTP/\d+\.\d+ (\d+)").expect("status line pattern compiles"));

#[derive(Clone)]
pub struct WebhookService {
    downstream: downstream::Client,
}

impl WebhookService {
    pub fn new(downstream: downstream::Client) -> Self {
        Self { downstream }
    }
}

impl WebhookService {
    /// Runs one webhook body through validation, filtering and forwarding.
    pub async fn handle_webhook(&self, raw: &[u8]) -> Reply {
        self.relay(raw).await.into()
    }

    pub async fn relay(&self, raw: &[u8]) -> super::Result<Outcome> {
        let event = InboundEvent::from_slice(raw).inspect_err(|e| {
            warn!("Invalid JSON or missing data: {e}");
        })?;
        let data = event.data;

        // Operator and bot messages would bounce back through the downstream API.
        if !data.sent_by_user() {
            let from = data.from();
            info!("Message ignored: sent by '{from}'");
            return Ok(Outcome::Ignored { from });
        }

        let session_id = data.session_id().ok_or_else(|| {
            warn!("Missing session ID");
            webhook::Error::MissingSessionId
        })?;

        let payload = OutboundPayload::new(session_id, &data);
        debug!("Sending payload: {payload:?}");

        let resp = self.downstream.send(&payload).await?;
        let http_code = parse_http_code(&resp.status_line)
            .unwrap_or(UNKNOWN_HTTP_CODE)
            .to_owned();

        info!("API response: HTTP {http_code} - {}", resp.body);

        Ok(Outcome::Forwarded {
            message: payload.message,
            node_response: node_response(&resp),
            http_code,
        })
    }
}

pub fn parse_http_code(status_line: &str) -> Option<&str> {
    STATUS_LINE
        .captures(status_line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Downstream bodies that are not JSON pass through as `null`.
fn node_response(resp: &DownstreamResponse) -> Value {
    serde_json::from_str(&resp.body).unwrap_or(Value::Null)
}
