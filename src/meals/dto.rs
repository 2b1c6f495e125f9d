use serde::{Deserialize, Serialize};
use time::{Date, Time};

use crate::formats::{clock_time, iso_date};
use crate::meals::repo_types::Meal;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    #[serde(with = "iso_date")]
    pub meal_date: Date,
    #[serde(with = "clock_time")]
    pub meal_time: Time,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub meal_date: Option<Date>,
    #[serde(default, deserialize_with = "clock_time::option::deserialize")]
    pub meal_time: Option<Time>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct MealListParams {
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn first_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
pub struct MealPage {
    pub meals: Vec<Meal>,
    pub page: usize,
    pub limit: usize,
}
