use serde::Deserialize;
use time::Date;

use crate::formats::{iso_date, nullable};
use crate::goals::repo_types::MacroType;

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    pub calories_target: f64,
    pub protein_target: Option<f64>,
    pub carbs_target: Option<f64>,
    pub fat_target: Option<f64>,
    pub fiber_target: Option<f64>,
    #[serde(default = "grams")]
    pub macro_type: MacroType,
    /// Absent means active.
    pub active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    /// `null` removes the end date.
    #[serde(default, deserialize_with = "iso_date::nullable::deserialize")]
    pub end_date: Option<Option<Date>>,
    pub calories_target: Option<f64>,
    /// Macro targets: `null` removes the target.
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub protein_target: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub carbs_target: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub fat_target: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub fiber_target: Option<Option<f64>>,
    pub macro_type: Option<MacroType>,
    pub active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalListParams {
    #[serde(default)]
    pub active_only: bool,
}

fn grams() -> MacroType {
    MacroType::Grams
}
