use std::sync::Arc;

use axum::extract::FromRef;

use crate::integration::downstream::{self, HttpDownstreamClient};
use crate::integration::{self, Config};
use crate::webhook;
use crate::webhook::service::WebhookService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub webhook_service: webhook::Service,
}

impl AppState {
    pub fn init(config: Config) -> integration::Result<Self> {
        let downstream = HttpDownstreamClient::try_new(&config.downstream)?;
        Ok(Self::with_downstream(config, Arc::new(downstream)))
    }

    pub fn with_downstream(config: Config, downstream: downstream::Client) -> Self {
        Self {
            config,
            webhook_service: Arc::new(WebhookService::new(downstream)),
        }
    }
}

impl FromRef<AppState> for webhook::Service {
    fn from_ref(s: &AppState) -> Self {
        s.webhook_service.clone()
    }
}
