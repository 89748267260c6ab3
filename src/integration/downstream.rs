use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

use crate::integration::{self, Error};
use crate::webhook::model::OutboundPayload;

const DEFAULT_URL: &str = "http://example.com/webhook";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct Config {
    url: Url,
    timeout: Duration,
    reject_error_status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_URL).expect("default downstream url is valid"),
            timeout: DEFAULT_TIMEOUT,
            reject_error_status: true,
        }
    }
}

impl Config {
    pub fn new(url: Url, timeout: Duration, reject_error_status: bool) -> Self {
        Self {
            url,
            timeout,
            reject_error_status,
        }
    }

    pub fn for_url(url: Url) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    /// Unset variables fall back to defaults, malformed ones are errors.
    pub fn env() -> integration::Result<Self> {
        let default = Self::default();

        let url = match env::var("DOWNSTREAM_URL") {
            Ok(url) => Url::parse(&url)?,
            Err(_) => default.url,
        };
        let timeout = match env::var("DOWNSTREAM_TIMEOUT") {
            Ok(secs) => Duration::from_secs(secs.parse()?),
            Err(_) => default.timeout,
        };
        let reject_error_status = match env::var("DOWNSTREAM_REJECT_ERROR_STATUS") {
            Ok(flag) => flag.parse()?,
            Err(_) => default.reject_error_status,
        };

        Ok(Self {
            url,
            timeout,
            reject_error_status,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn reject_error_status(&self) -> bool {
        self.reject_error_status
    }
}

/// What came back from the downstream API, status line included.
#[derive(Clone, Debug)]
pub struct DownstreamResponse {
    pub status_line: String,
    pub headers: HeaderMap,
    pub body: String,
}

#[async_trait]
pub trait DownstreamClient {
    async fn send(&self, payload: &OutboundPayload) -> integration::Result<DownstreamResponse>;
}

pub type Client = Arc<dyn DownstreamClient + Send + Sync>;

#[derive(Clone)]
pub struct HttpDownstreamClient {
    cfg: Arc<Config>,
    http: reqwest::Client,
}

impl HttpDownstreamClient {
    pub fn try_new(cfg: &Config) -> integration::Result<Self> {
        Ok(Self {
            cfg: Arc::new(cfg.to_owned()),
            http: integration::init_http_client(cfg.timeout)?,
        })
    }
}

#[async_trait]
impl DownstreamClient for HttpDownstreamClient {
    async fn send(&self, payload: &OutboundPayload) -> integration::Result<DownstreamResponse> {
        debug!("POST {} for session {}", self.cfg.url, payload.session_id);

        let resp = self
            .http
            .post(self.cfg.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if self.cfg.reject_error_status && (status.is_client_error() || status.is_server_error()) {
            return Err(Error::ErrorStatus(status));
        }

        let status_line = format!(
            "{:?} {} {}",
            resp.version(),
            status.as_str(),
            status.canonical_reason().unwrap_or_default()
        );
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        Ok(DownstreamResponse {
            status_line: status_line.trim_end().to_owned(),
            headers,
            body,
        })
    }
}
