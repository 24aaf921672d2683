use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::{config::LineConfig, error::DeliveryError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "originalContentUrl")]
        original_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_url: String,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }

    pub fn image(original_url: impl Into<String>, preview_url: impl Into<String>) -> Self {
        OutboundMessage::Image {
            original_url: original_url.into(),
            preview_url: preview_url.into(),
        }
    }
}

/// Chat platform send/receive surface.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError>;
    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError>;
    async fn fetch_content(&self, message_id: &str) -> Result<Bytes, DeliveryError>;
}

/// LINE Messaging API client.
pub struct LineMessenger {
    http: reqwest::Client,
    token: String,
    api_base: String,
    data_api_base: String,
}

impl LineMessenger {
    pub fn new(cfg: &LineConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: cfg.channel_access_token.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            data_api_base: cfg.data_api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), DeliveryError> {
        let res = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check(res).await.map(|_| ())
    }
}

async fn check(res: reqwest::Response) -> Result<reqwest::Response, DeliveryError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

#[async_trait]
impl Messenger for LineMessenger {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError> {
        debug!(count = messages.len(), "reply");
        self.post(
            "/v2/bot/message/reply",
            json!({ "replyToken": reply_token, "messages": messages }),
        )
        .await
    }

    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError> {
        debug!(%user_id, count = messages.len(), "push");
        self.post("/v2/bot/message/push", json!({ "to": user_id, "messages": messages }))
            .await
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Bytes, DeliveryError> {
        let res = self
            .http
            .get(format!("{}/v2/bot/message/{}/content", self.data_api_base, message_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(res).await?.bytes().await?)
    }
}
