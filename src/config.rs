use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    pub channel_access_token: String,
    pub api_base: String,
    pub data_api_base: String,
    pub push_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub utc_offset_hours: i8,
    pub broadcast_hour: u8,
    pub broadcast_minute: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub max_entries: usize,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub line: LineConfig,
    pub schedule: ScheduleConfig,
    pub charts: ChartConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let openai = OpenAiConfig {
            api_key: std::env::var("OPENAI_API_KEY")?,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            timeout_secs: env_or("VISION_TIMEOUT_SECS", 60),
        };
        let line = LineConfig {
            channel_access_token: std::env::var("LINE_CHANNEL_ACCESS_TOKEN")?,
            api_base: std::env::var("LINE_API_BASE").unwrap_or_else(|_| "https://api.line.me".into()),
            data_api_base: std::env::var("LINE_DATA_API_BASE")
                .unwrap_or_else(|_| "https://api-data.line.me".into()),
            push_timeout_secs: env_or("PUSH_TIMEOUT_SECS", 10),
        };
        let schedule = ScheduleConfig {
            utc_offset_hours: env_or("UTC_OFFSET_HOURS", 8),
            broadcast_hour: env_or("BROADCAST_HOUR", 23),
            broadcast_minute: env_or("BROADCAST_MINUTE", 0),
        };
        let charts = ChartConfig {
            max_entries: env_or::<usize>("CHART_CACHE_MAX_ENTRIES", 256).max(2),
            ttl_secs: env_or("CHART_CACHE_TTL_SECS", 600),
        };
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://proteinbot.db?mode=rwc".into()),
            base_url: std::env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            openai,
            line,
            schedule,
            charts,
        })
    }

    pub fn chart_url(&self, token: &str) -> String {
        format!("{}/chart/{}", self.base_url, token)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
