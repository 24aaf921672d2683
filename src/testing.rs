//! In-process stand-ins for the outbound collaborators.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::analysis::VisionClient;
use crate::bot::{Messenger, OutboundMessage};
use crate::charts::ChartRenderer;
use crate::error::{AnalysisError, ChartError, DeliveryError};
use crate::reports::WeeklySeries;

pub struct FakeVision {
    outcome: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeVision {
    pub fn reply(raw: &str) -> Self {
        Self {
            outcome: Ok(raw.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            ..Self::reply("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionClient for FakeVision {
    async fn describe(&self, _image: Bytes) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(AnalysisError::Vision)
    }
}

type Sent = Vec<(String, Vec<OutboundMessage>)>;

/// Records every reply and push instead of calling the platform.
pub struct RecordingMessenger {
    replies: Mutex<Sent>,
    pushes: Mutex<Sent>,
    rejected_users: HashSet<String>,
    content: Bytes,
    delay: Option<Duration>,
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self {
            replies: Mutex::default(),
            pushes: Mutex::default(),
            rejected_users: HashSet::new(),
            content: Bytes::from_static(b"\xFF\xD8\xFFjpeg"),
            delay: None,
        }
    }
}

impl RecordingMessenger {
    /// Image downloads come back empty.
    pub fn without_content(mut self) -> Self {
        self.content = Bytes::new();
        self
    }

    /// Pushes to `user_id` are refused by the platform.
    pub fn rejecting(mut self, user_id: &str) -> Self {
        self.rejected_users.insert(user_id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn replies(&self) -> Sent {
        self.replies.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Sent {
        self.pushes.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError> {
        self.pause().await;
        self.replies.lock().unwrap().push((reply_token.to_string(), messages));
        Ok(())
    }

    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>) -> Result<(), DeliveryError> {
        self.pause().await;
        if self.rejected_users.contains(user_id) {
            return Err(DeliveryError::Rejected {
                status: 400,
                body: "invalid user".into(),
            });
        }
        self.pushes.lock().unwrap().push((user_id.to_string(), messages));
        Ok(())
    }

    async fn fetch_content(&self, _message_id: &str) -> Result<Bytes, DeliveryError> {
        Ok(self.content.clone())
    }
}

pub struct FailingRenderer;

#[async_trait]
impl ChartRenderer for FailingRenderer {
    async fn render(&self, _series: &WeeklySeries) -> Result<Bytes, ChartError> {
        Err(ChartError::Render("font cache unavailable".into()))
    }
}
