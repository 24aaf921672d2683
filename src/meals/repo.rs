use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use time::{Date, PrimitiveDateTime};
use tracing::{debug, info};

use super::repo_types::{day_key, timestamp_key, DailyTotal, DayProtein, MealRecord, MealRow};
use crate::error::StorageError;

/// Durable per-user meal ledger. Every method is a single statement, so each
/// call is atomic at the SQLite transaction level.
#[derive(Clone, Debug)]
pub struct MealStore {
    pool: SqlitePool,
}

impl MealStore {
    /// Open (or create) the database at `url` and run pending migrations.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn add_meal(
        &self,
        user_id: &str,
        calories: f64,
        protein: f64,
        description: &str,
        at: PrimitiveDateTime,
    ) -> Result<i64, StorageError> {
        let id = sqlx::query(
            r#"
            INSERT INTO meals (user_id, timestamp, calories, protein, description, calendar_day)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(user_id)
        .bind(timestamp_key(at)?)
        .bind(calories)
        .bind(protein)
        .bind(description)
        .bind(day_key(at.date())?)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(%user_id, meal_id = id, calories, protein, "meal recorded");
        Ok(id)
    }

    pub async fn daily_total(&self, user_id: &str, day: Date) -> Result<DailyTotal, StorageError> {
        let (calories, protein, meal_count) = sqlx::query_as::<_, (f64, f64, i64)>(
            r#"
            SELECT CAST(COALESCE(SUM(calories), 0) AS REAL),
                   CAST(COALESCE(SUM(protein), 0) AS REAL),
                   COUNT(*)
            FROM meals
            WHERE user_id = ?1 AND calendar_day = ?2
            "#,
        )
        .bind(user_id)
        .bind(day_key(day)?)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyTotal {
            calories,
            protein,
            meal_count,
        })
    }

    pub async fn meals_for_day(&self, user_id: &str, day: Date) -> Result<Vec<MealRecord>, StorageError> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, timestamp, calories, protein, description, calendar_day
            FROM meals
            WHERE user_id = ?1 AND calendar_day = ?2
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(day_key(day)?)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MealRecord::try_from).collect()
    }

    /// Removes every record of `user_id` on `day`. Deleting an empty day returns 0.
    pub async fn delete_day(&self, user_id: &str, day: Date) -> Result<u64, StorageError> {
        let deleted = sqlx::query("DELETE FROM meals WHERE user_id = ?1 AND calendar_day = ?2")
            .bind(user_id)
            .bind(day_key(day)?)
            .execute(&self.pool)
            .await?
            .rows_affected();

        info!(%user_id, deleted, "day cleared");
        Ok(deleted)
    }

    /// Users with at least one record on `day`.
    pub async fn active_users(&self, day: Date) -> Result<Vec<String>, StorageError> {
        let users = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT user_id
            FROM meals
            WHERE calendar_day = ?1
            ORDER BY user_id
            "#,
        )
        .bind(day_key(day)?)
        .fetch_all(&self.pool)
        .await?;

        debug!(%day, count = users.len(), "active users");
        Ok(users)
    }

    /// Protein per day for the 7 days starting at `week_start`. Always 7 entries,
    /// days without records report 0.
    pub async fn protein_by_day(&self, user_id: &str, week_start: Date) -> Result<Vec<DayProtein>, StorageError> {
        let days: Vec<Date> = (0..7).map(|i| week_start + time::Duration::days(i)).collect();
        let rows = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT calendar_day, CAST(COALESCE(SUM(protein), 0) AS REAL)
            FROM meals
            WHERE user_id = ?1 AND calendar_day BETWEEN ?2 AND ?3
            GROUP BY calendar_day
            "#,
        )
        .bind(user_id)
        .bind(day_key(days[0])?)
        .bind(day_key(days[6])?)
        .fetch_all(&self.pool)
        .await?;

        days.into_iter()
            .map(|day| {
                let key = day_key(day)?;
                let protein = rows
                    .iter()
                    .find(|(d, _)| *d == key)
                    .map(|(_, p)| *p)
                    .unwrap_or(0.0);
                Ok(DayProtein { day, protein })
            })
            .collect()
    }

    /// Single-connection in-memory store for tests.
    #[cfg(test)]
    pub async fn memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Self::from_pool(pool).await.expect("migrations apply")
    }

    /// Shuts the pool; every later call fails with a storage error.
    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
