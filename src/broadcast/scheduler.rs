//! Nightly summary push.
//!
//! Fires once per local calendar day at the configured wall-clock time,
//! then pushes each active user their day summary. A failing recipient is
//! logged and skipped; the rest of the batch carries on. Missed windows
//! (process down at fire time) are not caught up.

use std::sync::Arc;
use std::time::Duration;

use time::{Date, PrimitiveDateTime, Time};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::bot::{Messenger, OutboundMessage, BROADCAST_HEADER};
use crate::clock::LocalClock;
use crate::error::{DeliveryError, StorageError};
use crate::meals::MealStore;
use crate::reports::ReportEngine;
use crate::state::AppState;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

pub struct BroadcastScheduler {
    store: MealStore,
    reports: ReportEngine,
    messenger: Arc<dyn Messenger>,
    clock: LocalClock,
    fire_at: Time,
    send_timeout: Duration,
}

impl BroadcastScheduler {
    pub fn from_state(st: &AppState) -> anyhow::Result<Self> {
        let schedule = &st.config.schedule;
        Ok(Self {
            store: st.store.clone(),
            reports: st.reports.clone(),
            messenger: st.messenger.clone(),
            clock: st.clock,
            fire_at: Time::from_hms(schedule.broadcast_hour, schedule.broadcast_minute, 0)?,
            send_timeout: Duration::from_secs(st.config.line.push_timeout_secs),
        })
    }

    /// Push every user active on `day` their summary.
    #[instrument(skip(self))]
    pub async fn run_once(&self, day: Date) -> Result<BroadcastSummary, StorageError> {
        let users = self.store.active_users(day).await?;
        let mut summary = BroadcastSummary::default();

        for user_id in &users {
            summary.attempted += 1;
            match self.send_to(user_id, day).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    info!(%user_id, "daily summary pushed");
                }
                Err(e) => error!(%user_id, error = %e, "daily summary push failed"),
            }
        }

        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            "daily broadcast finished"
        );
        Ok(summary)
    }

    async fn send_to(&self, user_id: &str, day: Date) -> anyhow::Result<()> {
        let text = self.reports.daily_summary_text_for(user_id, day).await?;
        let message = OutboundMessage::text(format!("{BROADCAST_HEADER}\n\n{text}"));
        tokio::time::timeout(self.send_timeout, self.messenger.push(user_id, vec![message]))
            .await
            .unwrap_or(Err(DeliveryError::Timeout(self.send_timeout.as_secs())))?;
        Ok(())
    }

    /// One wake-up of the loop at local time `now`. Fires when the fire time
    /// has been reached and `now`'s day has not fired yet. Returns the last
    /// day that fired.
    async fn tick(&self, last_fired: Option<Date>, now: PrimitiveDateTime) -> Option<Date> {
        let today = now.date();
        if last_fired == Some(today) {
            warn!(%today, "broadcast already fired today; skipping");
            return last_fired;
        }
        if now.time() < self.fire_at {
            debug!(%now, "woke before fire time");
            return last_fired;
        }

        if let Err(e) = self.run_once(today).await {
            error!(error = %e, "daily broadcast aborted");
        }
        Some(today)
    }

    /// Idle → Firing → Idle, forever. At most one firing per calendar day.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_fired: Option<Date> = None;
            loop {
                let wait = self.clock.until_next(self.fire_at);
                info!(wait_secs = wait.as_secs(), "next daily broadcast scheduled");
                tokio::time::sleep(wait).await;
                last_fired = self.tick(last_fired, self.clock.now()).await;
            }
        })
    }
}
