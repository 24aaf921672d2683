mod cache;
pub mod handlers;
mod render;
mod services;

pub use cache::ArtifactCache;
pub use render::{BarChartRenderer, ChartRenderer};
pub use services::{prepare_weekly_chart, WeeklyChart};
