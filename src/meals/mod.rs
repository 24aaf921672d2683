mod repo;
mod repo_types;

pub use repo::MealStore;
pub use repo_types::{DailyTotal, MealRecord};
