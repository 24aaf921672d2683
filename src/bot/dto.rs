use serde::Deserialize;

/// Webhook envelope posted by the chat platform.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text { text: String },
    Image { id: String },
    #[serde(other)]
    Other,
}

/// A message event the bot knows how to answer.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user_id: String,
    pub reply_token: String,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Text(String),
    Image { message_id: String },
}

impl WebhookEvent {
    /// Drops non-message events, unsupported message types, and events
    /// without a user or reply token.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        if self.kind != "message" {
            return None;
        }
        let kind = match self.message? {
            EventMessage::Text { text } => InboundKind::Text(text),
            EventMessage::Image { id } => InboundKind::Image { message_id: id },
            EventMessage::Other => return None,
        };
        Some(InboundEvent {
            user_id: self.source?.user_id?,
            reply_token: self.reply_token?,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "destination": "Ubot",
        "events": [
            {"type": "message", "replyToken": "r1", "source": {"type": "user", "userId": "U1"},
             "message": {"type": "text", "id": "m1", "text": "today"}},
            {"type": "message", "replyToken": "r2", "source": {"type": "user", "userId": "U2"},
             "message": {"type": "image", "id": "m2", "contentProvider": {"type": "line"}}},
            {"type": "message", "replyToken": "r3", "source": {"type": "user", "userId": "U3"},
             "message": {"type": "sticker", "id": "m3", "packageId": "1", "stickerId": "2"}},
            {"type": "follow", "replyToken": "r4", "source": {"type": "user", "userId": "U4"}},
            {"type": "message", "replyToken": "r5", "source": {"type": "group", "groupId": "G1"},
             "message": {"type": "text", "id": "m5", "text": "today"}}
        ]
    }"#;

    #[test]
    fn keeps_only_answerable_events() {
        let body: WebhookBody = serde_json::from_str(BODY).unwrap();
        let events: Vec<_> = body.events.into_iter().filter_map(WebhookEvent::into_inbound).collect();
        assert_eq!(
            events,
            vec![
                InboundEvent {
                    user_id: "U1".into(),
                    reply_token: "r1".into(),
                    kind: InboundKind::Text("today".into()),
                },
                InboundEvent {
                    user_id: "U2".into(),
                    reply_token: "r2".into(),
                    kind: InboundKind::Image { message_id: "m2".into() },
                },
            ]
        );
    }

    #[test]
    fn empty_envelope_is_fine() {
        let body: WebhookBody = serde_json::from_str("{}").unwrap();
        assert!(body.events.is_empty());
    }
}
