use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::formats::{clock_time, iso_date};

/// A meal is a dated container for meal items; it has no nutrients of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(with = "iso_date")]
    pub meal_date: Date,
    #[serde(with = "clock_time")]
    pub meal_time: Time,
    pub description: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct MealQuery {
    pub user_id: Uuid,
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// `(offset, limit)`; `None` returns every match.
    pub page: Option<(usize, usize)>,
}

impl MealQuery {
    pub fn single_day(user_id: Uuid, date: Date) -> Self {
        Self {
            user_id,
            start: Some(date),
            end: Some(date),
            page: None,
        }
    }

    pub fn matches(&self, meal: &Meal) -> bool {
        meal.user_id == self.user_id
            && self.start.map_or(true, |s| meal.meal_date >= s)
            && self.end.map_or(true, |e| meal.meal_date <= e)
    }
}
