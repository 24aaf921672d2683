use sqlx::FromRow;
use time::format_description::BorrowedFormatItem;
use time::{macros::format_description, Date, PrimitiveDateTime};

use crate::error::StorageError;

/// `YYYY-MM-DD`, the `calendar_day` column.
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// `YYYY-MM-DD HH:MM:SS`, the `timestamp` column.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Raw `meals` row as stored; dates kept as text.
#[derive(Debug, FromRow)]
pub struct MealRow {
    pub id: i64,
    pub user_id: String,
    pub timestamp: String,
    pub calories: f64,
    pub protein: f64,
    pub description: String,
    pub calendar_day: String,
}

/// One analyzed meal. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct MealRecord {
    pub id: i64,
    pub user_id: String,
    pub timestamp: PrimitiveDateTime,
    pub calendar_day: Date,
    pub calories: f64,
    pub protein: f64,
    pub description: String,
}

impl TryFrom<MealRow> for MealRecord {
    type Error = StorageError;

    fn try_from(r: MealRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StorageError::CorruptRow { id: r.id, reason };
        let timestamp = PrimitiveDateTime::parse(&r.timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| corrupt(format!("timestamp {:?}: {}", r.timestamp, e)))?;
        let calendar_day = Date::parse(&r.calendar_day, DAY_FORMAT)
            .map_err(|e| corrupt(format!("calendar_day {:?}: {}", r.calendar_day, e)))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            timestamp,
            calendar_day,
            calories: r.calories,
            protein: r.protein,
            description: r.description,
        })
    }
}

/// Calories, protein and meal count for one user on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotal {
    pub calories: f64,
    pub protein: f64,
    pub meal_count: i64,
}

impl DailyTotal {
    pub fn from_meals(meals: &[MealRecord]) -> Self {
        meals.iter().fold(Self::default(), |acc, m| Self {
            calories: acc.calories + m.calories,
            protein: acc.protein + m.protein,
            meal_count: acc.meal_count + 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProtein {
    pub day: Date,
    pub protein: f64,
}

pub(crate) fn day_key(day: Date) -> Result<String, StorageError> {
    Ok(day.format(DAY_FORMAT)?)
}

pub(crate) fn timestamp_key(at: PrimitiveDateTime) -> Result<String, StorageError> {
    Ok(at.format(TIMESTAMP_FORMAT)?)
}
