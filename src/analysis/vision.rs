use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{config::OpenAiConfig, error::AnalysisError};

const SYSTEM_PROMPT: &str = r#"你是專業的營養師。分析圖片中的食物,估算:
1. 總熱量(kcal)
2. 蛋白質含量(g)
3. 食物描述

請以 JSON 格式回覆:
{
  "calories": 數字,
  "protein": 數字,
  "description": "詳細食物內容"
}

估算要準確,考慮份量大小。"#;

const USER_PROMPT: &str = "請分析這份餐點的熱量與蛋白質";

/// Vision model that looks at a meal photo and answers in free text.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn describe(&self, image: Bytes) -> Result<String, AnalysisError>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiVision {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiVision {
    pub fn new(cfg: &OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }

    fn request_body(&self, image: &[u8]) -> serde_json::Value {
        let data_uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "image_url", "image_url": { "url": data_uri } },
                        { "type": "text", "text": USER_PROMPT }
                    ]
                }
            ],
            "max_tokens": 500,
            "temperature": 0.3
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionClient for OpenAiVision {
    async fn describe(&self, image: Bytes) -> Result<String, AnalysisError> {
        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&image))
            .send()
            .await
            .map_err(|e| AnalysisError::Vision(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(AnalysisError::Vision(format!("status {status}: {body}")));
        }

        let completion: ChatCompletion = res
            .json()
            .await
            .map_err(|e| AnalysisError::Vision(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AnalysisError::EmptyResponse)?;

        debug!(chars = content.len(), "vision reply received");
        Ok(content)
    }
}
