use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::commands::Command;
use super::dto::{InboundEvent, InboundKind};
use super::messenger::OutboundMessage;
use super::replies;
use crate::charts::{prepare_weekly_chart, WeeklyChart};
use crate::error::{AnalysisError, ChartError, DeliveryError, StorageError};
use crate::reports::meal_reply;
use crate::state::AppState;

/// Failures that end up as reply text rather than an HTTP status.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("image download failed: {0}")]
    Content(#[source] DeliveryError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl DispatchError {
    pub fn user_text(&self) -> String {
        match self {
            DispatchError::Content(_) => replies::analysis_failed(false),
            DispatchError::Analysis(e) => replies::analysis_failed(e.is_timeout()),
            DispatchError::Storage(_) => replies::storage_failed(),
            DispatchError::Chart(e) => replies::chart_failed(&e.to_string()),
        }
    }
}

/// Handle one inbound event end to end and send the reply.
#[instrument(skip(st, event), fields(user_id = %event.user_id))]
pub async fn dispatch(st: &AppState, event: InboundEvent) {
    let messages = match &event.kind {
        InboundKind::Text(text) => handle_text(st, &event.user_id, text).await,
        InboundKind::Image { message_id } => handle_image(st, &event.user_id, message_id).await,
    };

    let timeout = Duration::from_secs(st.config.line.push_timeout_secs);
    let sent = tokio::time::timeout(timeout, st.messenger.reply(&event.reply_token, messages))
        .await
        .unwrap_or(Err(DeliveryError::Timeout(timeout.as_secs())));
    if let Err(e) = sent {
        error!(error = %e, user_id = %event.user_id, "reply failed");
    }
}

pub async fn handle_text(st: &AppState, user_id: &str, text: &str) -> Vec<OutboundMessage> {
    let command = Command::classify(text);
    info!(%user_id, ?command, "text command");

    let result = match command {
        Command::Today => st
            .reports
            .daily_summary_text(user_id)
            .await
            .map(|t| vec![OutboundMessage::text(t)])
            .map_err(DispatchError::from),
        Command::Help => Ok(vec![OutboundMessage::text(replies::HELP)]),
        Command::ClearToday => st
            .store
            .delete_day(user_id, st.clock.today())
            .await
            .map(|n| vec![OutboundMessage::text(replies::cleared(n))])
            .map_err(DispatchError::from),
        Command::WeeklyReport => weekly_report(st, user_id).await,
        Command::Unknown => Ok(vec![OutboundMessage::text(replies::GUIDANCE)]),
    };

    result.unwrap_or_else(|e| {
        error!(error = %e, %user_id, ?command, "command failed");
        vec![OutboundMessage::text(e.user_text())]
    })
}

async fn weekly_report(st: &AppState, user_id: &str) -> Result<Vec<OutboundMessage>, DispatchError> {
    match prepare_weekly_chart(st, user_id).await? {
        WeeklyChart::NoRecords => Ok(vec![OutboundMessage::text(replies::WEEK_EMPTY)]),
        WeeklyChart::Ready {
            summary,
            url,
            preview_url,
        } => Ok(vec![OutboundMessage::text(summary), OutboundMessage::image(url, preview_url)]),
    }
}

pub async fn handle_image(st: &AppState, user_id: &str, message_id: &str) -> Vec<OutboundMessage> {
    match record_meal(st, user_id, message_id).await {
        Ok(text) => vec![OutboundMessage::text(text)],
        Err(e) => {
            warn!(error = %e, %user_id, %message_id, "meal photo not recorded");
            vec![OutboundMessage::text(e.user_text())]
        }
    }
}

/// Photo → estimate → ledger → per-meal reply text.
async fn record_meal(st: &AppState, user_id: &str, message_id: &str) -> Result<String, DispatchError> {
    let image = st
        .messenger
        .fetch_content(message_id)
        .await
        .map_err(DispatchError::Content)?;
    let estimate = st.pipeline.analyze(image).await?;

    st.store
        .add_meal(
            user_id,
            estimate.calories,
            estimate.protein,
            &estimate.description,
            st.clock.now(),
        )
        .await?;
    let today = st.store.daily_total(user_id, st.clock.today()).await?;

    Ok(meal_reply(&estimate, &today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingRenderer, FakeVision, RecordingMessenger};
    use std::sync::Arc;

    fn text_of(messages: &[OutboundMessage]) -> &str {
        match &messages[0] {
            OutboundMessage::Text { text } => text.as_str(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn photo_is_analyzed_stored_and_summarized() {
        let vision = FakeVision::reply(r#"{"calories": 650, "protein": 45, "description": "烤雞胸沙拉"}"#);
        let st = AppState::fake_with(Arc::new(vision), Arc::new(RecordingMessenger::default())).await;

        let reply = handle_image(&st, "U1", "m1").await;
        let text = text_of(&reply);
        assert!(text.contains("烤雞胸沙拉"));
        assert!(text.contains("45.0 g"));
        assert!(text.contains("[█░░░░░░░░░]"));

        let total = st.store.daily_total("U1", st.clock.today()).await.unwrap();
        assert_eq!(total.calories, 650.0);
        assert_eq!(total.protein, 45.0);
        assert_eq!(total.meal_count, 1);
    }

    #[tokio::test]
    async fn analysis_failure_stores_nothing() {
        let vision = FakeVision::reply("no food here");
        let st = AppState::fake_with(Arc::new(vision), Arc::new(RecordingMessenger::default())).await;

        let reply = handle_image(&st, "U1", "m1").await;
        assert!(text_of(&reply).starts_with("【分析失敗】"));
        assert!(!text_of(&reply).contains("no food here"));
        assert_eq!(st.store.daily_total("U1", st.clock.today()).await.unwrap().meal_count, 0);
    }

    #[tokio::test]
    async fn missing_image_content_is_an_analysis_failure() {
        let messenger = RecordingMessenger::default().without_content();
        let st = AppState::fake_with(Arc::new(FakeVision::reply("{}")), Arc::new(messenger)).await;
        let reply = handle_image(&st, "U1", "m1").await;
        assert!(text_of(&reply).starts_with("【分析失敗】"));
    }

    #[tokio::test]
    async fn text_commands_route() {
        let st = AppState::fake().await;
        assert_eq!(text_of(&handle_text(&st, "U1", "help").await), replies::HELP);
        assert_eq!(text_of(&handle_text(&st, "U1", "hello").await), replies::GUIDANCE);
        assert!(text_of(&handle_text(&st, "U1", "today").await).contains("今日尚無記錄"));
        assert_eq!(text_of(&handle_text(&st, "U1", "週報").await), replies::WEEK_EMPTY);
    }

    #[tokio::test]
    async fn clear_today_deletes_and_reports_count() {
        let st = AppState::fake().await;
        st.store.add_meal("U1", 1.0, 10.0, "a", st.clock.now()).await.unwrap();
        st.store.add_meal("U1", 1.0, 10.0, "b", st.clock.now()).await.unwrap();

        assert_eq!(text_of(&handle_text(&st, "U1", "clear today").await), replies::cleared(2));
        assert_eq!(text_of(&handle_text(&st, "U1", "clear today").await), replies::cleared(0));
    }

    #[tokio::test]
    async fn weekly_report_sends_text_and_image() {
        let st = AppState::fake().await;
        st.store.add_meal("U1", 500.0, 90.0, "牛排", st.clock.now()).await.unwrap();

        let reply = handle_text(&st, "U1", "weekly report").await;
        assert_eq!(reply.len(), 2);
        assert!(text_of(&reply).contains("90g"));
        let OutboundMessage::Image { original_url, preview_url } = &reply[1] else {
            panic!("expected image");
        };
        assert_ne!(original_url, preview_url);
        assert!(original_url.starts_with("https://bot.test/chart/"));
        assert!(preview_url.starts_with("https://bot.test/chart/"));
    }

    #[tokio::test]
    async fn weekly_report_falls_back_to_text() {
        let mut st = AppState::fake().await;
        st.renderer = Arc::new(FailingRenderer);
        st.store.add_meal("U1", 500.0, 90.0, "牛排", st.clock.now()).await.unwrap();

        let reply = handle_text(&st, "U1", "週報").await;
        assert_eq!(reply.len(), 1);
        assert!(text_of(&reply).starts_with("週報產生失敗"));
    }

    #[tokio::test]
    async fn storage_outage_becomes_a_generic_reply() {
        let vision = Arc::new(FakeVision::reply(r#"{"calories": 650, "protein": 45, "description": "烤雞胸沙拉"}"#));
        let st = AppState::fake_with(vision.clone(), Arc::new(RecordingMessenger::default())).await;
        st.store.close().await;

        let failed = replies::storage_failed();
        assert_eq!(text_of(&handle_text(&st, "U1", "today").await), failed);
        assert_eq!(text_of(&handle_text(&st, "U1", "clear today").await), failed);

        let reply = handle_image(&st, "U1", "m1").await;
        assert_eq!(text_of(&reply), failed);
        // the estimate was produced but never acknowledged as recorded
        assert_eq!(vision.calls(), 1);
        assert!(!text_of(&reply).contains("烤雞胸沙拉"));
    }

    #[tokio::test]
    async fn dispatch_replies_with_token() {
        let messenger = Arc::new(RecordingMessenger::default());
        let st = AppState::fake_with(Arc::new(FakeVision::reply("{}")), messenger.clone()).await;
        dispatch(
            &st,
            InboundEvent {
                user_id: "U1".into(),
                reply_token: "r1".into(),
                kind: InboundKind::Text("help".into()),
            },
        )
        .await;

        let sent = messenger.replies();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "r1");
        assert_eq!(sent[0].1, vec![OutboundMessage::text(replies::HELP)]);
    }
}
