use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use crate::formats::iso_date;

/// How protein, carb and fat targets are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroType {
    /// Absolute grams per day.
    Grams,
    /// Percent of the calorie target.
    Percentage,
}

impl MacroType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroType::Grams => "grams",
            MacroType::Percentage => "percentage",
        }
    }
}

impl FromStr for MacroType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grams" => Ok(MacroType::Grams),
            "percentage" => Ok(MacroType::Percentage),
            other => anyhow::bail!("unknown macro type `{other}`"),
        }
    }
}

/// A user's dietary goal. At most one goal per user is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub macro_type: MacroType,
    pub active: bool,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub calories_target: f64,
    pub protein_target: Option<f64>,
    pub carbs_target: Option<f64>,
    pub fat_target: Option<f64>,
    pub fiber_target: Option<f64>,
    pub macro_type: String,
    pub active: bool,
    pub notes: Option<String>,
}

impl TryFrom<GoalRow> for Goal {
    type Error = anyhow::Error;

    fn try_from(r: GoalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            start_date: r.start_date,
            end_date: r.end_date,
            calories_target: r.calories_target,
            protein_target: r.protein_target,
            carbs_target: r.carbs_target,
            fat_target: r.fat_target,
            fiber_target: r.fiber_target,
            macro_type: r.macro_type.parse()?,
            active: r.active,
            notes: r.notes,
        })
    }
}
