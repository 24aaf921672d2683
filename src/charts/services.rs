use tracing::{info, instrument};

use crate::error::ChartError;
use crate::reports::{WeeklyReport, DAILY_PROTEIN_TARGET};
use crate::state::AppState;

/// Outcome of a weekly-report request.
#[derive(Debug, Clone, PartialEq)]
pub enum WeeklyChart {
    NoRecords,
    Ready {
        summary: String,
        url: String,
        preview_url: String,
    },
}

/// Build this week's series, render it, and park the image behind two
/// single-use URLs: the platform fetches the preview and the full image
/// separately.
#[instrument(skip(st))]
pub async fn prepare_weekly_chart(st: &AppState, user_id: &str) -> Result<WeeklyChart, ChartError> {
    let series = match st.reports.weekly_chart_data(user_id).await? {
        WeeklyReport::Empty => return Ok(WeeklyChart::NoRecords),
        WeeklyReport::Series(series) => series,
    };

    let png = st.renderer.render(&series).await?;
    let token = st.charts.put(png.clone());
    let preview_token = st.charts.put(png);
    info!(%user_id, %token, %preview_token, total_protein = series.total_protein, "weekly chart cached");

    Ok(WeeklyChart::Ready {
        summary: format!(
            "本週總蛋白質：{:.0}g（目標 {:.0}g/日）",
            series.total_protein, DAILY_PROTEIN_TARGET
        ),
        url: st.config.chart_url(&token),
        preview_url: st.config.chart_url(&preview_token),
    })
}
