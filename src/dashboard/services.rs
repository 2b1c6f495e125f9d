use time::{Date, OffsetDateTime};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::dashboard::dto::{DashboardReport, GoalProgress, MealSummary, RemainingMacros};
use crate::error::EngineError;
use crate::goals::repo_types::{Goal, MacroType};
use crate::goals::services::active_goal;
use crate::meal_items::repo_types::MealItem;
use crate::meals::repo_types::Meal;
use crate::nutrition::energy::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN};
use crate::nutrition::{MacroDistribution, Nutrients};
use crate::store::{MealItemStore, MealStore, Store};

/// Daily targets of a goal, all in grams except calories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

impl Targets {
    /// Percentage-mode macro targets are turned into grams of the calorie
    /// target. A zero target counts as no target.
    pub fn from_goal(goal: &Goal) -> Self {
        let to_grams = |target: Option<f64>, kcal_per_gram: f64| -> Option<f64> {
            let target = target.filter(|t| *t > 0.0)?;
            Some(match goal.macro_type {
                MacroType::Grams => target,
                MacroType::Percentage => goal.calories_target * target / 100.0 / kcal_per_gram,
            })
        };
        Self {
            calories: goal.calories_target,
            protein: to_grams(goal.protein_target, KCAL_PER_GRAM_PROTEIN),
            carbs: to_grams(goal.carbs_target, KCAL_PER_GRAM_CARBS),
            fat: to_grams(goal.fat_target, KCAL_PER_GRAM_FAT),
            fiber: goal.fiber_target.filter(|t| *t > 0.0),
        }
    }
}

fn percent(value: f64, target: f64) -> f64 {
    value / target * 100.0
}

/// Pure part of the dashboard: folds the day's meals and their items into
/// the report.
pub fn build_report(
    date: Date,
    meals: Vec<(Meal, Vec<MealItem>)>,
    goal: Option<&Goal>,
    now: OffsetDateTime,
) -> DashboardReport {
    let mut daily = Nutrients::ZERO;
    let mut summaries = Vec::with_capacity(meals.len());
    for (meal, items) in meals {
        let subtotal: Nutrients = items.iter().map(|i| i.nutrition).sum();
        daily += subtotal;
        summaries.push(MealSummary {
            meal_id: meal.id,
            meal_name: meal.name,
            meal_time: meal.meal_time,
            nutrition: subtotal,
        });
    }

    let targets = goal.map(Targets::from_goal);
    let goal_progress = targets.map(|t| GoalProgress {
        calories: percent(daily.calories, t.calories),
        protein: t.protein.map(|p| percent(daily.protein, p)),
        carbs: t.carbs.map(|c| percent(daily.carbs, c)),
        fat: t.fat.map(|f| percent(daily.fat, f)),
        fiber: t.fiber.map(|f| percent(daily.fiber, f)),
    });
    let remaining_macros = targets.map(|t| RemainingMacros {
        protein: t.protein.map(|p| p - daily.protein),
        carbs: t.carbs.map(|c| c - daily.carbs),
        fat: t.fat.map(|f| f - daily.fat),
        fiber: t.fiber.map(|f| f - daily.fiber),
    });

    DashboardReport {
        date,
        daily_summary: daily,
        macro_distribution: MacroDistribution::from_totals(&daily),
        meals: summaries,
        goal_progress,
        remaining_calories: targets.map(|t| t.calories - daily.calories),
        remaining_macros,
        last_updated: now,
    }
}

/// Recomputes the user's report for `date` (today, UTC, when absent) from the
/// stored snapshots and the active goal.
#[instrument(skip(store))]
pub async fn daily_report(
    store: &dyn Store,
    user_id: Uuid,
    date: Option<Date>,
) -> Result<DashboardReport, EngineError> {
    let now = OffsetDateTime::now_utc();
    let date = date.unwrap_or_else(|| now.date());

    let meals = store.meals_on(user_id, date).await?;
    let mut with_items = Vec::with_capacity(meals.len());
    for meal in meals {
        let items = store.list_meal_items(meal.id).await?;
        with_items.push((meal, items));
    }
    let goal = active_goal(store, user_id).await?;

    let report = build_report(date, with_items, goal.as_ref(), now);
    debug!(
        %date,
        meals = report.meals.len(),
        calories = report.daily_summary.calories,
        has_goal = goal.is_some(),
        "dashboard computed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use super::*;
    use crate::foods::services::fixtures::{banana, rice};
    use crate::goals::services::{create_goal, fixtures::goal_req};
    use crate::goals::UserLocks;
    use crate::meal_items::dto::CreateMealItemRequest;
    use crate::meal_items::services::create_meal_item;
    use crate::meals::services::{create_meal, fixtures::meal_req};
    use crate::nutrition::Unit;
    use crate::store::InMemoryStore;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn grams(food_id: Uuid, quantity: f64) -> CreateMealItemRequest {
        CreateMealItemRequest {
            food_id: Some(food_id),
            recipe_id: None,
            quantity,
            unit: Unit::G,
            observation: None,
        }
    }

    #[tokio::test]
    async fn empty_day_without_goal() {
        let store = InMemoryStore::new();
        let report = daily_report(&store, Uuid::new_v4(), Some(date!(2024 - 05 - 02)))
            .await
            .unwrap();

        assert_eq!(report.daily_summary, Nutrients::ZERO);
        assert_eq!(report.macro_distribution, MacroDistribution::default());
        assert!(report.meals.is_empty());
        assert!(report.goal_progress.is_none());
        assert!(report.remaining_calories.is_none());
        assert!(report.remaining_macros.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["date"], "2024-05-02");
        assert!(json["goal_progress"].is_null());
    }

    #[tokio::test]
    async fn sums_meals_of_the_day_and_tracks_goal() {
        let (b, r) = (banana(), rice());
        let store = InMemoryStore::with_foods(vec![b.clone(), r.clone()]);
        let locks = UserLocks::new();
        let user = Uuid::new_v4();
        let day = date!(2024 - 05 - 02);

        let breakfast = create_meal(&store, user, meal_req("Breakfast", day, time!(8:00)))
            .await
            .unwrap();
        let lunch = create_meal(&store, user, meal_req("Lunch", day, time!(12:30)))
            .await
            .unwrap();
        let tomorrow = create_meal(&store, user, meal_req("Later", date!(2024 - 05 - 03), time!(9:00)))
            .await
            .unwrap();

        create_meal_item(&store, user, breakfast.id, grams(b.id, 150.0)).await.unwrap();
        create_meal_item(&store, user, lunch.id, grams(r.id, 200.0)).await.unwrap();
        create_meal_item(&store, user, lunch.id, grams(b.id, 100.0)).await.unwrap();
        create_meal_item(&store, user, tomorrow.id, grams(r.id, 500.0)).await.unwrap();

        create_goal(&store, &locks, user, goal_req("Cut", None)).await.unwrap();

        let report = daily_report(&store, user, Some(day)).await.unwrap();

        assert_eq!(report.meals.len(), 2);
        assert_eq!(report.meals[0].meal_name, "Breakfast");
        assert!(close(report.meals[0].nutrition.calories, 133.5));
        assert!(close(report.meals[1].nutrition.calories, 260.0 + 89.0));

        let total = 133.5 + 260.0 + 89.0;
        assert!(close(report.daily_summary.calories, total));

        let progress = report.goal_progress.unwrap();
        assert!(close(progress.calories, total / 2000.0 * 100.0));
        let protein = 1.65 + 5.4 + 1.1;
        assert!((progress.protein.unwrap() - protein / 150.0 * 100.0).abs() < 1e-9);
        assert_eq!(progress.carbs, None);
        assert!(close(report.remaining_calories.unwrap(), 2000.0 - total));
        assert_eq!(report.remaining_macros.unwrap().fat, None);

        let d = report.macro_distribution;
        assert!((d.protein + d.carbs + d.fat - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn date_defaults_to_today_utc() {
        let b = banana();
        let store = InMemoryStore::with_foods(vec![b.clone()]);
        let user = Uuid::new_v4();
        let today = OffsetDateTime::now_utc().date();

        let meal = create_meal(&store, user, meal_req("Now", today, time!(0:00)))
            .await
            .unwrap();
        create_meal_item(&store, user, meal.id, grams(b.id, 100.0)).await.unwrap();

        let report = daily_report(&store, user, None).await.unwrap();
        // a run straddling midnight UTC sees the next day, with nothing logged
        if report.date == today {
            assert_eq!(report.meals.len(), 1);
            assert!(close(report.daily_summary.calories, 89.0));
        } else {
            assert_eq!(report.date, today.next_day().unwrap());
            assert!(report.meals.is_empty());
        }
        assert_eq!(report.date, report.last_updated.date());
    }

    #[test]
    fn percentage_targets_become_grams() {
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Balanced".into(),
            start_date: date!(2024 - 01 - 01),
            end_date: None,
            calories_target: 2000.0,
            protein_target: Some(30.0),
            carbs_target: Some(40.0),
            fat_target: Some(30.0),
            fiber_target: Some(25.0),
            macro_type: MacroType::Percentage,
            active: true,
            notes: None,
        };
        let t = Targets::from_goal(&goal);
        assert!(close(t.protein.unwrap(), 150.0));
        assert!(close(t.carbs.unwrap(), 200.0));
        assert!(close(t.fat.unwrap(), 2000.0 * 0.3 / 9.0));
        assert_eq!(t.fiber, Some(25.0));
    }

    #[test]
    fn zero_target_is_untargeted() {
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Calories only".into(),
            start_date: date!(2024 - 01 - 01),
            end_date: None,
            calories_target: 1800.0,
            protein_target: Some(0.0),
            carbs_target: None,
            fat_target: None,
            fiber_target: Some(0.0),
            macro_type: MacroType::Grams,
            active: true,
            notes: None,
        };
        let report = build_report(
            date!(2024 - 05 - 02),
            vec![],
            Some(&goal),
            datetime!(2024-05-02 10:00 UTC),
        );
        let progress = report.goal_progress.unwrap();
        assert_eq!(progress.calories, 0.0);
        assert_eq!(progress.protein, None);
        assert_eq!(progress.fiber, None);
        assert_eq!(report.remaining_calories, Some(1800.0));
    }
}
