mod format;
mod services;

pub use format::{meal_reply, DAILY_PROTEIN_TARGET};
pub use services::{ReportEngine, WeeklyEntry, WeeklyReport, WeeklySeries};
