use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::foods::services::reference_amount;
use crate::nutrition::{scale, Nutrients};
use crate::recipes::dto::{CreateRecipeRequest, UpdateRecipeRequest};
use crate::recipes::repo_types::{Ingredient, Recipe, RecipeNutrition, RecipeQuery};
use crate::store::{FoodStore, RecipeStore, Store};
use crate::validation;

const NAME_MAX_LEN: usize = 100;
const DEFAULT_CATEGORY: &str = "other";

/// Sums the scaled profile of every ingredient and divides by `servings`.
///
/// Any missing food aborts the whole computation, so no partial recipe can be
/// built from the result. Another user's private food counts as missing.
pub async fn aggregate(
    store: &dyn Store,
    user_id: Uuid,
    ingredients: &[Ingredient],
    servings: u32,
) -> Result<RecipeNutrition, EngineError> {
    if servings == 0 {
        return Err(EngineError::InvalidServings);
    }

    let mut totals = Nutrients::ZERO;
    for ing in ingredients {
        let food = store
            .food_by_id(ing.food_id)
            .await?
            .filter(|f| f.visible_to(user_id))
            .ok_or_else(|| EngineError::missing_ref(EntityKind::Food, ing.food_id))?;
        let amount = reference_amount(&food, ing.quantity, ing.unit)?;
        totals += scale(&food.nutrients, amount);
    }

    Ok(RecipeNutrition {
        totals,
        per_serving: totals.divided(f64::from(servings)),
    })
}

fn check_servings(servings: u32) -> Result<u32, EngineError> {
    if servings == 0 {
        Err(EngineError::InvalidServings)
    } else {
        Ok(servings)
    }
}

fn check_ingredients(ingredients: &[Ingredient]) -> Result<(), EngineError> {
    if ingredients.is_empty() {
        return Err(EngineError::Validation(
            "a recipe needs at least one ingredient".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(store, req), fields(name = %req.name))]
pub async fn create_recipe(
    store: &dyn Store,
    user_id: Uuid,
    req: CreateRecipeRequest,
) -> Result<Recipe, EngineError> {
    let name = validation::name("recipe name", &req.name, NAME_MAX_LEN)?;
    let servings = check_servings(req.servings)?;
    check_ingredients(&req.ingredients)?;

    let nutrition = aggregate(store, user_id, &req.ingredients, servings).await?;

    let now = OffsetDateTime::now_utc();
    let recipe = Recipe {
        id: Uuid::new_v4(),
        user_id,
        name,
        description: validation::optional_text(req.description),
        category: validation::optional_text(req.category).unwrap_or_else(|| DEFAULT_CATEGORY.into()),
        servings,
        prep_time_minutes: req.prep_time_minutes,
        ingredients: req.ingredients,
        instructions: validation::optional_text(req.instructions),
        nutrition,
        is_public: req.is_public.unwrap_or(false),
        tags: req.tags.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    let recipe = store.upsert_recipe(recipe).await?;
    info!(recipe_id = %recipe.id, calories = recipe.nutrition.totals.calories, "recipe created");
    Ok(recipe)
}

/// Recipes the caller can read: their own and public ones.
#[instrument(skip(store))]
pub async fn get_recipe(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Recipe, EngineError> {
    match store.recipe_by_id(id).await? {
        Some(r) if r.visible_to(user_id) => Ok(r),
        _ => Err(EngineError::not_found(EntityKind::Recipe, id)),
    }
}

async fn owned_recipe(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Recipe, EngineError> {
    match store.recipe_by_id(id).await? {
        Some(r) if r.user_id == user_id => Ok(r),
        _ => Err(EngineError::not_found(EntityKind::Recipe, id)),
    }
}

#[instrument(skip(store))]
pub async fn list_recipes(store: &dyn Store, query: &RecipeQuery) -> Result<Vec<Recipe>, EngineError> {
    Ok(store.list_recipes(query).await?)
}

#[instrument(skip(store, req))]
pub async fn update_recipe(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
    req: UpdateRecipeRequest,
) -> Result<Recipe, EngineError> {
    let mut recipe = owned_recipe(store, user_id, id).await?;

    if let Some(name) = req.name {
        recipe.name = validation::name("recipe name", &name, NAME_MAX_LEN)?;
    }
    if let Some(description) = req.description {
        recipe.description = validation::optional_text(Some(description));
    }
    if let Some(category) = validation::optional_text(req.category) {
        recipe.category = category;
    }
    if let Some(prep) = req.prep_time_minutes {
        recipe.prep_time_minutes = Some(prep);
    }
    if let Some(instructions) = req.instructions {
        recipe.instructions = validation::optional_text(Some(instructions));
    }
    if let Some(is_public) = req.is_public {
        recipe.is_public = is_public;
    }
    if let Some(tags) = req.tags {
        recipe.tags = tags;
    }

    let mut recompute = false;
    if let Some(servings) = req.servings {
        recipe.servings = check_servings(servings)?;
        recompute = true;
    }
    if let Some(ingredients) = req.ingredients {
        check_ingredients(&ingredients)?;
        recipe.ingredients = ingredients;
        recompute = true;
    }
    if recompute {
        recipe.nutrition = aggregate(store, user_id, &recipe.ingredients, recipe.servings).await?;
        debug!(recipe_id = %recipe.id, "recipe nutrition recomputed");
    }

    recipe.updated_at = OffsetDateTime::now_utc();
    Ok(store.upsert_recipe(recipe).await?)
}

#[instrument(skip(store))]
pub async fn delete_recipe(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), EngineError> {
    owned_recipe(store, user_id, id).await?;
    store.delete_recipe(id).await?;
    info!(recipe_id = %id, "recipe deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::services::fixtures::{banana, rice};
    use crate::nutrition::{Quantity, Unit};
    use crate::store::InMemoryStore;

    fn ingredient(food_id: Uuid, grams: f64) -> Ingredient {
        Ingredient {
            food_id,
            quantity: Quantity::new(grams).unwrap(),
            unit: Unit::G,
        }
    }

    fn create_req(ingredients: Vec<Ingredient>, servings: u32) -> CreateRecipeRequest {
        CreateRecipeRequest {
            name: "Rice bowl".into(),
            description: None,
            category: None,
            servings,
            prep_time_minutes: Some(15),
            ingredients,
            instructions: None,
            is_public: None,
            tags: None,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn two_hundred_grams_of_rice_over_two_servings() {
        let rice = rice();
        let store = InMemoryStore::with_foods(vec![rice.clone()]);
        let recipe = create_recipe(&store, Uuid::new_v4(), create_req(vec![ingredient(rice.id, 200.0)], 2))
            .await
            .unwrap();

        assert!(close(recipe.nutrition.totals.calories, 260.0));
        assert!(close(recipe.nutrition.per_serving.calories, 130.0));
        assert_eq!(recipe.category, "other");
    }

    #[tokio::test]
    async fn missing_ingredient_aborts_without_persisting() {
        let rice = rice();
        let store = InMemoryStore::with_foods(vec![rice.clone()]);
        let ghost = Uuid::new_v4();
        let user = Uuid::new_v4();

        let err = create_recipe(
            &store,
            user,
            create_req(vec![ingredient(rice.id, 100.0), ingredient(ghost, 50.0)], 1),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            EngineError::ReferenceNotFound { kind: EntityKind::Food, id } if id == ghost
        ));
        let stored = store
            .list_recipes(&RecipeQuery { user_id: Some(user), limit: 50, ..Default::default() })
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn aggregation_is_idempotent_and_per_serving_times_servings_is_totals() {
        let (rice, banana) = (rice(), banana());
        let store = InMemoryStore::with_foods(vec![rice.clone(), banana.clone()]);
        let mut cup = ingredient(rice.id, 1.5);
        cup.unit = Unit::Cup;
        let ings = vec![cup, ingredient(banana.id, 118.0), ingredient(rice.id, 33.3)];

        let user = Uuid::new_v4();
        for servings in [1, 3, 7] {
            let a = aggregate(&store, user, &ings, servings).await.unwrap();
            let b = aggregate(&store, user, &ings, servings).await.unwrap();
            assert_eq!(a, b);

            let back = a.per_serving.scaled(f64::from(servings));
            assert!((back.calories - a.totals.calories).abs() < 1e-6);
            assert!((back.protein - a.totals.protein).abs() < 1e-6);
            assert!((back.fiber - a.totals.fiber).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn private_food_of_another_user_is_not_an_ingredient() {
        let owner = Uuid::new_v4();
        let mut secret = banana();
        secret.is_public = false;
        secret.creator_user_id = Some(owner);
        let store = InMemoryStore::with_foods(vec![secret.clone()]);

        let stranger = Uuid::new_v4();
        let err = create_recipe(&store, stranger, create_req(vec![ingredient(secret.id, 100.0)], 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::ReferenceNotFound { kind: EntityKind::Food, id } if id == secret.id
        ));

        let own = create_recipe(&store, owner, create_req(vec![ingredient(secret.id, 100.0)], 1))
            .await
            .unwrap();
        assert!(close(own.nutrition.totals.calories, 89.0));
    }

    #[tokio::test]
    async fn zero_servings_is_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(
            aggregate(&store, Uuid::new_v4(), &[], 0).await,
            Err(EngineError::InvalidServings)
        ));
        let err = create_recipe(&store, Uuid::new_v4(), create_req(vec![], 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidServings));
    }

    #[tokio::test]
    async fn empty_ingredient_list_is_rejected() {
        let store = InMemoryStore::new();
        let err = create_recipe(&store, Uuid::new_v4(), create_req(vec![], 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn changing_servings_recomputes_per_serving() {
        let rice = rice();
        let store = InMemoryStore::with_foods(vec![rice.clone()]);
        let user = Uuid::new_v4();
        let recipe = create_recipe(&store, user, create_req(vec![ingredient(rice.id, 200.0)], 2))
            .await
            .unwrap();

        let updated = update_recipe(
            &store,
            user,
            recipe.id,
            UpdateRecipeRequest {
                servings: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(close(updated.nutrition.totals.calories, 260.0));
        assert!(close(updated.nutrition.per_serving.calories, 65.0));

        let stored = store.recipe_by_id(recipe.id).await.unwrap().unwrap();
        assert_eq!(stored.nutrition, updated.nutrition);
    }

    #[tokio::test]
    async fn changing_ingredients_recomputes_totals() {
        let (rice, banana) = (rice(), banana());
        let store = InMemoryStore::with_foods(vec![rice.clone(), banana.clone()]);
        let user = Uuid::new_v4();
        let recipe = create_recipe(&store, user, create_req(vec![ingredient(rice.id, 200.0)], 2))
            .await
            .unwrap();

        let updated = update_recipe(
            &store,
            user,
            recipe.id,
            UpdateRecipeRequest {
                ingredients: Some(vec![ingredient(banana.id, 100.0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(close(updated.nutrition.totals.calories, 89.0));
        assert!(close(updated.nutrition.per_serving.calories, 44.5));
    }

    #[tokio::test]
    async fn metadata_update_keeps_nutrition() {
        let rice = rice();
        let store = InMemoryStore::with_foods(vec![rice.clone()]);
        let user = Uuid::new_v4();
        let recipe = create_recipe(&store, user, create_req(vec![ingredient(rice.id, 200.0)], 2))
            .await
            .unwrap();

        let updated = update_recipe(
            &store,
            user,
            recipe.id,
            UpdateRecipeRequest {
                name: Some("Plain rice".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Plain rice");
        assert_eq!(updated.nutrition, recipe.nutrition);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_private_recipes() {
        let rice = rice();
        let store = InMemoryStore::with_foods(vec![rice.clone()]);
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let recipe = create_recipe(&store, owner, create_req(vec![ingredient(rice.id, 100.0)], 1))
            .await
            .unwrap();

        assert!(matches!(
            get_recipe(&store, stranger, recipe.id).await,
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            delete_recipe(&store, stranger, recipe.id).await,
            Err(EngineError::NotFound { .. })
        ));
        delete_recipe(&store, owner, recipe.id).await.unwrap();
        assert!(store.recipe_by_id(recipe.id).await.unwrap().is_none());
    }
}
