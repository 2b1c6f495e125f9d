use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::formats::{clock_time, iso_date};
use crate::nutrition::{MacroDistribution, Nutrients};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Defaults to today (UTC).
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MealSummary {
    pub meal_id: Uuid,
    pub meal_name: String,
    #[serde(with = "clock_time")]
    pub meal_time: Time,
    #[serde(flatten)]
    pub nutrition: Nutrients,
}

/// Percent of each target reached; `None` where the goal sets no target.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GoalProgress {
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RemainingMacros {
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub daily_summary: Nutrients,
    pub macro_distribution: MacroDistribution,
    pub meals: Vec<MealSummary>,
    pub goal_progress: Option<GoalProgress>,
    pub remaining_calories: Option<f64>,
    pub remaining_macros: Option<RemainingMacros>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}
