use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::goals::dto::{CreateGoalRequest, UpdateGoalRequest};
use crate::goals::locks::UserLocks;
use crate::goals::repo_types::Goal;
use crate::store::{GoalStore, Store};
use crate::validation;

const NAME_MAX_LEN: usize = 100;
const NOTES_MAX_LEN: usize = 500;
const MAX_CALORIES_TARGET: f64 = 10_000.0;

fn validate(goal: &Goal) -> Result<(), EngineError> {
    let c = goal.calories_target;
    if !c.is_finite() || c <= 0.0 || c > MAX_CALORIES_TARGET {
        return Err(EngineError::Validation(format!(
            "calories target must be greater than 0 and at most {MAX_CALORIES_TARGET}"
        )));
    }
    validation::non_negative("protein target", goal.protein_target)?;
    validation::non_negative("carbs target", goal.carbs_target)?;
    validation::non_negative("fat target", goal.fat_target)?;
    validation::non_negative("fiber target", goal.fiber_target)?;
    if let Some(end) = goal.end_date {
        if end < goal.start_date {
            return Err(EngineError::Validation(
                "end date must not be before start date".into(),
            ));
        }
    }
    if goal.notes.as_ref().is_some_and(|n| n.chars().count() > NOTES_MAX_LEN) {
        return Err(EngineError::Validation(format!(
            "notes must be at most {NOTES_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Every other currently active goal of the user, switched off.
async fn deactivations(
    store: &dyn Store,
    user_id: Uuid,
    keep: Uuid,
) -> Result<Vec<Goal>, EngineError> {
    let active = store.list_goals(user_id, true).await?;
    Ok(active
        .into_iter()
        .filter(|g| g.id != keep)
        .map(|mut g| {
            g.active = false;
            g
        })
        .collect())
}

/// Writes the deactivations and then `target` as one batch.
async fn commit(store: &dyn Store, mut batch: Vec<Goal>, target: Goal) -> Result<Goal, EngineError> {
    let deactivated = batch.len();
    batch.push(target);
    if let Err(e) = store.save_goals(&batch).await {
        error!(error = %e, user_id = %batch[deactivated].user_id, "goal batch rejected");
        return Err(EngineError::InvariantViolation(format!(
            "could not write goal changes: {e:#}"
        )));
    }
    let goal = batch.swap_remove(deactivated);
    if deactivated > 0 {
        info!(user_id = %goal.user_id, goal_id = %goal.id, deactivated, "other goals deactivated");
    }
    Ok(goal)
}

/// Creates a goal. Unless `active` is explicitly `false`, every other active
/// goal of the user is deactivated in the same write.
#[instrument(skip(store, locks, req))]
pub async fn create_goal(
    store: &dyn Store,
    locks: &UserLocks,
    user_id: Uuid,
    req: CreateGoalRequest,
) -> Result<Goal, EngineError> {
    let goal = Goal {
        id: Uuid::new_v4(),
        user_id,
        name: validation::name("goal name", &req.name, NAME_MAX_LEN)?,
        start_date: req.start_date,
        end_date: req.end_date,
        calories_target: req.calories_target,
        protein_target: req.protein_target,
        carbs_target: req.carbs_target,
        fat_target: req.fat_target,
        fiber_target: req.fiber_target,
        macro_type: req.macro_type,
        active: req.active.unwrap_or(true),
        notes: validation::optional_text(req.notes),
    };
    validate(&goal)?;

    let _guard = locks.lock(user_id).await;
    let batch = if goal.active {
        deactivations(store, user_id, goal.id).await?
    } else {
        Vec::new()
    };
    let goal = commit(store, batch, goal).await?;
    info!(goal_id = %goal.id, active = goal.active, "goal created");
    Ok(goal)
}

/// Updates a goal. Setting `active = true` deactivates the user's other
/// goals; any other change has no effect on them.
#[instrument(skip(store, locks, req))]
pub async fn update_goal(
    store: &dyn Store,
    locks: &UserLocks,
    user_id: Uuid,
    id: Uuid,
    req: UpdateGoalRequest,
) -> Result<Goal, EngineError> {
    let _guard = locks.lock(user_id).await;
    let mut goal = get_goal(store, user_id, id).await?;

    if let Some(name) = req.name {
        goal.name = validation::name("goal name", &name, NAME_MAX_LEN)?;
    }
    if let Some(start) = req.start_date {
        goal.start_date = start;
    }
    if let Some(end_date) = req.end_date {
        goal.end_date = end_date;
    }
    if let Some(c) = req.calories_target {
        goal.calories_target = c;
    }
    if let Some(protein_target) = req.protein_target {
        goal.protein_target = protein_target;
    }
    if let Some(carbs_target) = req.carbs_target {
        goal.carbs_target = carbs_target;
    }
    if let Some(fat_target) = req.fat_target {
        goal.fat_target = fat_target;
    }
    if let Some(fiber_target) = req.fiber_target {
        goal.fiber_target = fiber_target;
    }
    if let Some(macro_type) = req.macro_type {
        goal.macro_type = macro_type;
    }
    if let Some(notes) = req.notes {
        goal.notes = validation::optional_text(Some(notes));
    }
    if let Some(active) = req.active {
        goal.active = active;
    }
    validate(&goal)?;

    let batch = if req.active == Some(true) {
        deactivations(store, user_id, goal.id).await?
    } else {
        Vec::new()
    };
    commit(store, batch, goal).await
}

#[instrument(skip(store))]
pub async fn get_goal(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Goal, EngineError> {
    match store.goal_by_id(id).await? {
        Some(g) if g.user_id == user_id => Ok(g),
        _ => Err(EngineError::not_found(EntityKind::Goal, id)),
    }
}

#[instrument(skip(store))]
pub async fn list_goals(
    store: &dyn Store,
    user_id: Uuid,
    active_only: bool,
) -> Result<Vec<Goal>, EngineError> {
    Ok(store.list_goals(user_id, active_only).await?)
}

/// The user's active goal, if any.
pub async fn active_goal(store: &dyn Store, user_id: Uuid) -> Result<Option<Goal>, EngineError> {
    Ok(store.list_goals(user_id, true).await?.into_iter().next())
}
