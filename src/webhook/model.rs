use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub const USER_SENDER: &str = "user";
pub const UNKNOWN_HTTP_CODE: &str = "UNKNOWN";

const DEFAULT_CONTENT: &str = "No message";
const DEFAULT_WEBSITE_ID: &str = "example-website-id";
const DEFAULT_FROM: &str = "unknown";

/// Webhook envelope as delivered by the chat platform.
#[derive(Debug)]
pub struct InboundEvent {
    pub data: EventData,
}

impl InboundEvent {
    /// Fails only on unparseable JSON or a missing or null `data` member.
    pub fn from_slice(raw: &[u8]) -> super::Result<Self> {
        let mut value: Value = serde_json::from_slice(raw)?;

        match value.get_mut("data").map(Value::take) {
            None | Some(Value::Null) => Err(super::Error::InvalidData),
            Some(data) => Ok(Self { data: data.into() }),
        }
    }
}

/// Event fields, read leniently. A non-object `data` has no fields at all.
#[derive(Debug, Default)]
pub struct EventData {
    fields: Map<String, Value>,
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl EventData {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    fn text(&self, name: &str) -> Option<String> {
        self.field(name).map(|v| match v {
            Value::String(s) => s.to_owned(),
            Value::Bool(true) => "1".to_owned(),
            Value::Bool(false) => String::new(),
            other => other.to_string(),
        })
    }

    /// Forwarded verbatim, whatever its JSON type.
    pub fn content(&self) -> Value {
        self.field("content")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT.into())
    }

    /// Empty ids count as missing. Unlike PHP truthiness, `"0"` is a valid id.
    pub fn session_id(&self) -> Option<String> {
        self.text("session_id").filter(|id| !id.is_empty())
    }

    pub fn website_id(&self) -> String {
        self.text("website_id")
            .unwrap_or_else(|| DEFAULT_WEBSITE_ID.to_owned())
    }

    pub fn from(&self) -> String {
        self.text("from").unwrap_or_else(|| DEFAULT_FROM.to_owned())
    }

    pub fn sent_by_user(&self) -> bool {
        self.field("from").and_then(Value::as_str) == Some(USER_SENDER)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OutboundPayload {
    pub session_id: String,
    pub website_id: String,
    pub message: Value,
}

impl OutboundPayload {
    pub fn new(session_id: String, data: &EventData) -> Self {
        Self {
            session_id,
            website_id: data.website_id(),
            message: data.content(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Ignored {
        from: String,
    },
    Forwarded {
        message: Value,
        node_response: Value,
        http_code: String,
    },
}

impl Outcome {
    fn into_body(self) -> Value {
        match self {
            Self::Ignored { from } => json!({
                "status": "ignored",
                "reason": format!("Message sent by {from}"),
            }),
            Self::Forwarded {
                message,
                node_response,
                http_code,
            } => json!({
                "status": "success",
                "message_sent": message,
                "node_response": node_response,
                "http_code": http_code,
            }),
        }
    }
}

/// Status and JSON body returned to the webhook caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status, json!({ "error": message }))
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        Self::new(StatusCode::OK, outcome.into_body())
    }
}

impl From<super::Result<Outcome>> for Reply {
    fn from(result: super::Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(e) => e.into(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
