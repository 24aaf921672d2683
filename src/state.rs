use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{AnalysisPipeline, OpenAiVision, VisionClient};
use crate::bot::{LineMessenger, Messenger};
use crate::charts::{ArtifactCache, BarChartRenderer, ChartRenderer};
use crate::clock::LocalClock;
use crate::config::AppConfig;
use crate::meals::MealStore;
use crate::reports::ReportEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: MealStore,
    pub clock: LocalClock,
    pub pipeline: AnalysisPipeline,
    pub reports: ReportEngine,
    pub charts: Arc<ArtifactCache>,
    pub renderer: Arc<dyn ChartRenderer>,
    pub messenger: Arc<dyn Messenger>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = MealStore::connect(&config.database_url).await?;

        let vision = Arc::new(OpenAiVision::new(&config.openai)) as Arc<dyn VisionClient>;
        let messenger = Arc::new(LineMessenger::new(&config.line)) as Arc<dyn Messenger>;
        let renderer = Arc::new(BarChartRenderer::default()) as Arc<dyn ChartRenderer>;

        Self::from_parts(config, store, vision, renderer, messenger)
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: MealStore,
        vision: Arc<dyn VisionClient>,
        renderer: Arc<dyn ChartRenderer>,
        messenger: Arc<dyn Messenger>,
    ) -> anyhow::Result<Self> {
        let clock = LocalClock::from_hours(config.schedule.utc_offset_hours)?;
        let pipeline = AnalysisPipeline::new(vision, Duration::from_secs(config.openai.timeout_secs));
        let reports = ReportEngine::new(store.clone(), clock);
        let charts = Arc::new(ArtifactCache::new(
            config.charts.max_entries,
            Duration::from_secs(config.charts.ttl_secs),
        ));

        Ok(Self {
            config,
            store,
            clock,
            pipeline,
            reports,
            charts,
            renderer,
            messenger,
        })
    }
}

#[cfg(test)]
impl AppState {
    pub async fn fake() -> Self {
        use crate::testing::{FakeVision, RecordingMessenger};

        let vision = FakeVision::reply(r#"{"calories": 0, "protein": 0, "description": "水"}"#);
        Self::fake_with(Arc::new(vision), Arc::new(RecordingMessenger::default())).await
    }

    pub async fn fake_with(vision: Arc<dyn VisionClient>, messenger: Arc<dyn Messenger>) -> Self {
        use crate::config::{ChartConfig, LineConfig, OpenAiConfig, ScheduleConfig};

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            base_url: "https://bot.test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            openai: OpenAiConfig {
                api_key: "test".into(),
                base_url: "http://vision.invalid".into(),
                model: "test".into(),
                timeout_secs: 5,
            },
            line: LineConfig {
                channel_access_token: "test".into(),
                api_base: "http://line.invalid".into(),
                data_api_base: "http://line.invalid".into(),
                push_timeout_secs: 5,
            },
            schedule: ScheduleConfig {
                utc_offset_hours: 8,
                broadcast_hour: 23,
                broadcast_minute: 0,
            },
            charts: ChartConfig {
                max_entries: 16,
                ttl_secs: 600,
            },
        });

        let store = MealStore::memory().await;
        let renderer = Arc::new(BarChartRenderer::default()) as Arc<dyn ChartRenderer>;
        Self::from_parts(config, store, vision, renderer, messenger).expect("fake state")
    }
}
