use time::Date;
use tracing::instrument;

use super::format::{daily_summary, NO_RECORDS_TODAY};
use crate::clock::{week_start, LocalClock};
use crate::error::StorageError;
use crate::meals::{DailyTotal, MealStore};

const WEEKDAY_LABELS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyEntry {
    pub day: Date,
    pub weekday_label: &'static str,
    pub protein: f64,
}

/// Monday→Sunday protein series for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySeries {
    pub days: Vec<WeeklyEntry>,
    pub total_protein: f64,
}

/// `Empty` when nothing was recorded this week; callers skip the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum WeeklyReport {
    Empty,
    Series(WeeklySeries),
}

/// Read-side aggregation over the meal ledger. Nothing is cached; every
/// call recomputes from storage.
#[derive(Clone)]
pub struct ReportEngine {
    store: MealStore,
    clock: LocalClock,
}

impl ReportEngine {
    pub fn new(store: MealStore, clock: LocalClock) -> Self {
        Self { store, clock }
    }

    pub async fn daily_summary_text(&self, user_id: &str) -> Result<String, StorageError> {
        self.daily_summary_text_for(user_id, self.clock.today()).await
    }

    #[instrument(skip(self))]
    pub async fn daily_summary_text_for(&self, user_id: &str, day: Date) -> Result<String, StorageError> {
        let meals = self.store.meals_for_day(user_id, day).await?;
        if meals.is_empty() {
            return Ok(NO_RECORDS_TODAY.to_string());
        }
        let total = DailyTotal::from_meals(&meals);
        Ok(daily_summary(&meals, &total))
    }

    pub async fn weekly_chart_data(&self, user_id: &str) -> Result<WeeklyReport, StorageError> {
        self.weekly_chart_data_for(user_id, self.clock.today()).await
    }

    #[instrument(skip(self))]
    pub async fn weekly_chart_data_for(&self, user_id: &str, today: Date) -> Result<WeeklyReport, StorageError> {
        let days: Vec<WeeklyEntry> = self
            .store
            .protein_by_day(user_id, week_start(today))
            .await?
            .into_iter()
            .zip(WEEKDAY_LABELS)
            .map(|(d, weekday_label)| WeeklyEntry {
                day: d.day,
                weekday_label,
                protein: d.protein,
            })
            .collect();

        let total_protein: f64 = days.iter().map(|d| d.protein).sum();
        if total_protein <= 0.0 {
            return Ok(WeeklyReport::Empty);
        }
        Ok(WeeklyReport::Series(WeeklySeries { days, total_protein }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    async fn engine() -> (ReportEngine, MealStore) {
        let store = MealStore::memory().await;
        (ReportEngine::new(store.clone(), LocalClock::new(offset!(+8))), store)
    }

    #[tokio::test]
    async fn summary_without_meals_is_the_fixed_message() {
        let (engine, _) = engine().await;
        let text = engine.daily_summary_text_for("U1", date!(2024-03-06)).await.unwrap();
        assert_eq!(text, NO_RECORDS_TODAY);
    }

    #[tokio::test]
    async fn summary_lists_meals_and_gap() {
        let (engine, store) = engine().await;
        store.add_meal("U1", 400.0, 30.0, "蛋餅", datetime!(2024-03-06 08:00:00)).await.unwrap();
        store.add_meal("U1", 650.0, 45.0, "烤雞胸沙拉", datetime!(2024-03-06 12:30:00)).await.unwrap();

        let text = engine.daily_summary_text_for("U1", date!(2024-03-06)).await.unwrap();
        assert!(text.contains("1. 蛋餅"));
        assert!(text.contains("2. 烤雞胸沙拉"));
        assert!(text.contains("1050 kcal"));
        assert!(text.contains("75.0 g / 300 g"));
        assert!(text.contains("[██░░░░░░░░]"));
        assert!(text.contains("還缺 225g"));
    }

    #[tokio::test]
    async fn weekly_series_is_monday_first_for_any_weekday() {
        let (engine, store) = engine().await;
        store.add_meal("U1", 1.0, 40.0, "mon", datetime!(2024-03-04 08:00:00)).await.unwrap();
        store.add_meal("U1", 1.0, 60.0, "sun", datetime!(2024-03-10 20:00:00)).await.unwrap();

        for today in [date!(2024-03-04), date!(2024-03-07), date!(2024-03-10)] {
            let WeeklyReport::Series(series) = engine.weekly_chart_data_for("U1", today).await.unwrap() else {
                panic!("expected a series for {today}");
            };
            assert_eq!(series.days.len(), 7);
            assert_eq!(series.days[0].day, date!(2024-03-04));
            assert_eq!(series.days[0].weekday_label, "一");
            assert_eq!(series.days[0].protein, 40.0);
            assert_eq!(series.days[6].day, date!(2024-03-10));
            assert_eq!(series.days[6].weekday_label, "日");
            assert_eq!(series.days[6].protein, 60.0);
            assert_eq!(series.total_protein, 100.0);
        }
    }

    #[tokio::test]
    async fn empty_week_is_distinguishable() {
        let (engine, store) = engine().await;
        // last week's meal does not count
        store.add_meal("U1", 1.0, 40.0, "old", datetime!(2024-03-03 08:00:00)).await.unwrap();
        let report = engine.weekly_chart_data_for("U1", date!(2024-03-06)).await.unwrap();
        assert_eq!(report, WeeklyReport::Empty);
    }
}
