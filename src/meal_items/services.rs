use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::foods::services::reference_amount;
use crate::meal_items::dto::{CreateMealItemRequest, UpdateMealItemRequest};
use crate::meal_items::repo_types::{ItemSource, MealItem};
use crate::meals::services::owned_meal;
use crate::nutrition::{scale, units, Nutrients, Quantity, Unit};
use crate::store::{FoodStore, MealItemStore, RecipeStore, Store};
use crate::validation;

/// Computes the nutrition snapshot for `quantity` `unit` of `source`, using the
/// source's current profile: a food's raw profile or a recipe's per-serving one.
pub async fn resolve(
    store: &dyn Store,
    user_id: Uuid,
    source: ItemSource,
    quantity: Quantity,
    unit: Unit,
) -> Result<Nutrients, EngineError> {
    match source {
        ItemSource::Food(id) => {
            let food = store
                .food_by_id(id)
                .await?
                .filter(|f| f.visible_to(user_id))
                .ok_or_else(|| EngineError::missing_ref(EntityKind::Food, id))?;
            let amount = reference_amount(&food, quantity, unit)?;
            Ok(scale(&food.nutrients, amount))
        }
        ItemSource::Recipe(id) => {
            let recipe = store
                .recipe_by_id(id)
                .await?
                .filter(|r| r.visible_to(user_id))
                .ok_or_else(|| EngineError::missing_ref(EntityKind::Recipe, id))?;
            let amount = units::recipe_reference_amount(quantity, unit)?.ok_or(
                EngineError::UnsupportedUnit {
                    unit,
                    kind: EntityKind::Recipe,
                    id,
                },
            )?;
            Ok(scale(&recipe.nutrition.per_serving, amount))
        }
    }
}

#[instrument(skip(store, req))]
pub async fn create_meal_item(
    store: &dyn Store,
    user_id: Uuid,
    meal_id: Uuid,
    req: CreateMealItemRequest,
) -> Result<MealItem, EngineError> {
    if owned_meal(store, user_id, meal_id).await?.is_none() {
        return Err(EngineError::ParentNotFound(meal_id));
    }
    let source = ItemSource::from_refs(req.food_id, req.recipe_id)?;
    let quantity = Quantity::new(req.quantity)?;

    let nutrition = resolve(store, user_id, source, quantity, req.unit).await?;

    let item = MealItem {
        id: Uuid::new_v4(),
        meal_id,
        source,
        quantity,
        unit: req.unit,
        nutrition,
        observation: validation::optional_text(req.observation),
    };
    let item = store.upsert_meal_item(item).await?;
    info!(
        item_id = %item.id,
        %meal_id,
        source = %item.source.kind(),
        calories = item.nutrition.calories,
        "meal item created"
    );
    Ok(item)
}

/// Loads an item whose parent meal belongs to `user_id`.
async fn owned_item(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<MealItem, EngineError> {
    let not_found = || EngineError::not_found(EntityKind::MealItem, id);
    let item = store.meal_item_by_id(id).await?.ok_or_else(not_found)?;
    match owned_meal(store, user_id, item.meal_id).await? {
        Some(_) => Ok(item),
        None => Err(not_found()),
    }
}

#[instrument(skip(store))]
pub async fn get_meal_item(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<MealItem, EngineError> {
    owned_item(store, user_id, id).await
}

/// Applies the update. A changed quantity or unit re-resolves the snapshot from
/// the current food or recipe; an observation-only change keeps it.
#[instrument(skip(store, req))]
pub async fn update_meal_item(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
    req: UpdateMealItemRequest,
) -> Result<MealItem, EngineError> {
    let mut item = owned_item(store, user_id, id).await?;

    let quantity = match req.quantity {
        Some(q) => Quantity::new(q)?,
        None => item.quantity,
    };
    let unit = req.unit.unwrap_or(item.unit);

    if quantity != item.quantity || unit != item.unit {
        item.nutrition = resolve(store, user_id, item.source, quantity, unit).await?;
        item.quantity = quantity;
        item.unit = unit;
        debug!(item_id = %item.id, "meal item snapshot recomputed");
    }
    if let Some(observation) = req.observation {
        item.observation = validation::optional_text(Some(observation));
    }

    Ok(store.upsert_meal_item(item).await?)
}

#[instrument(skip(store))]
pub async fn list_meal_items(
    store: &dyn Store,
    user_id: Uuid,
    meal_id: Uuid,
) -> Result<Vec<MealItem>, EngineError> {
    if owned_meal(store, user_id, meal_id).await?.is_none() {
        return Err(EngineError::ParentNotFound(meal_id));
    }
    Ok(store.list_meal_items(meal_id).await?)
}

#[instrument(skip(store))]
pub async fn delete_meal_item(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), EngineError> {
    owned_item(store, user_id, id).await?;
    store.delete_meal_item(id).await?;
    info!(item_id = %id, "meal item deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::{date, time};

    use super::*;
    use crate::foods::services::fixtures::{banana, rice};
    use crate::meals::services::{create_meal, delete_meal, fixtures::meal_req};
    use crate::recipes::dto::CreateRecipeRequest;
    use crate::recipes::repo_types::Ingredient;
    use crate::recipes::services::{create_recipe, update_recipe};
    use crate::store::{InMemoryStore, MealStore};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn food_item(food_id: Uuid, quantity: f64, unit: Unit) -> CreateMealItemRequest {
        CreateMealItemRequest {
            food_id: Some(food_id),
            recipe_id: None,
            quantity,
            unit,
            observation: None,
        }
    }

    async fn setup() -> (InMemoryStore, Uuid, Uuid) {
        let store = InMemoryStore::with_foods(vec![banana(), rice()]);
        let user = Uuid::new_v4();
        let meal = create_meal(&store, user, meal_req("Snack", date!(2024 - 05 - 02), time!(16:00)))
            .await
            .unwrap();
        (store, user, meal.id)
    }

    async fn food_named(store: &InMemoryStore, name: &str) -> crate::foods::repo_types::Food {
        store
            .search_foods(&crate::foods::repo_types::FoodQuery {
                text: Some(name.into()),
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn banana_snapshot_at_150_grams() {
        let (store, user, meal_id) = setup().await;
        let banana = food_named(&store, "banana").await;

        let item = create_meal_item(&store, user, meal_id, food_item(banana.id, 150.0, Unit::G))
            .await
            .unwrap();

        assert_eq!(item.source, ItemSource::Food(banana.id));
        assert!(close(item.nutrition.calories, 133.5));
        assert!(close(item.nutrition.protein, 1.65));
        assert!(close(item.nutrition.carbs, 34.2));
        assert!(close(item.nutrition.fat, 0.45));
    }

    #[tokio::test]
    async fn household_unit_goes_through_conversion_factor() {
        let (store, user, meal_id) = setup().await;
        let banana = food_named(&store, "banana").await;

        let item = create_meal_item(&store, user, meal_id, food_item(banana.id, 1.0, Unit::Unit))
            .await
            .unwrap();
        assert!(close(item.nutrition.calories, 89.0 * 1.18));

        let err = create_meal_item(&store, user, meal_id, food_item(banana.id, 1.0, Unit::Slice))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedUnit { unit: Unit::Slice, .. }));
    }

    #[tokio::test]
    async fn recipe_item_scales_per_serving_profile() {
        let (store, user, meal_id) = setup().await;
        let rice = food_named(&store, "rice").await;
        let recipe = create_recipe(
            &store,
            user,
            CreateRecipeRequest {
                name: "Rice".into(),
                description: None,
                category: None,
                servings: 2,
                prep_time_minutes: None,
                ingredients: vec![Ingredient {
                    food_id: rice.id,
                    quantity: Quantity::new(200.0).unwrap(),
                    unit: Unit::G,
                }],
                instructions: None,
                is_public: None,
                tags: None,
            },
        )
        .await
        .unwrap();

        let req = CreateMealItemRequest {
            food_id: None,
            recipe_id: Some(recipe.id),
            quantity: 1.5,
            unit: Unit::Portion,
            observation: None,
        };
        let item = create_meal_item(&store, user, meal_id, req).await.unwrap();
        // 1.5 servings of 130 kcal, not 1.5% of the 260 kcal total
        assert!(close(item.nutrition.calories, 195.0));
    }

    #[tokio::test]
    async fn missing_parent_is_checked_first() {
        let (store, user, _) = setup().await;
        let ghost_meal = Uuid::new_v4();
        let req = CreateMealItemRequest {
            food_id: None,
            recipe_id: None,
            quantity: -1.0,
            unit: Unit::G,
            observation: None,
        };
        let err = create_meal_item(&store, user, ghost_meal, req).await.unwrap_err();
        assert!(matches!(err, EngineError::ParentNotFound(id) if id == ghost_meal));
    }

    #[tokio::test]
    async fn reference_must_be_exactly_one() {
        let (store, user, meal_id) = setup().await;
        let banana = food_named(&store, "banana").await;

        let neither = CreateMealItemRequest {
            food_id: None,
            recipe_id: None,
            quantity: 10.0,
            unit: Unit::G,
            observation: None,
        };
        assert!(matches!(
            create_meal_item(&store, user, meal_id, neither).await,
            Err(EngineError::InvalidReference(_))
        ));

        let both = CreateMealItemRequest {
            food_id: Some(banana.id),
            recipe_id: Some(Uuid::new_v4()),
            quantity: 10.0,
            unit: Unit::G,
            observation: None,
        };
        assert!(matches!(
            create_meal_item(&store, user, meal_id, both).await,
            Err(EngineError::InvalidReference(_))
        ));
        assert!(store.list_meal_items(meal_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_food_and_bad_quantity_are_rejected() {
        let (store, user, meal_id) = setup().await;
        let ghost = Uuid::new_v4();
        let err = create_meal_item(&store, user, meal_id, food_item(ghost, 10.0, Unit::G))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::ReferenceNotFound { kind: EntityKind::Food, id } if id == ghost
        ));

        let banana = food_named(&store, "banana").await;
        for bad in [0.0, -5.0, f64::NAN] {
            let err = create_meal_item(&store, user, meal_id, food_item(banana.id, bad, Unit::G))
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidQuantity(_)));
        }
    }

    #[tokio::test]
    async fn quantity_update_recomputes_from_current_recipe() {
        let (store, user, meal_id) = setup().await;
        let rice = food_named(&store, "rice").await;
        let banana = food_named(&store, "banana").await;
        let recipe = create_recipe(
            &store,
            user,
            CreateRecipeRequest {
                name: "Bowl".into(),
                description: None,
                category: None,
                servings: 1,
                prep_time_minutes: None,
                ingredients: vec![Ingredient {
                    food_id: rice.id,
                    quantity: Quantity::new(100.0).unwrap(),
                    unit: Unit::G,
                }],
                instructions: None,
                is_public: None,
                tags: None,
            },
        )
        .await
        .unwrap();

        let req = CreateMealItemRequest {
            food_id: None,
            recipe_id: Some(recipe.id),
            quantity: 1.0,
            unit: Unit::Portion,
            observation: None,
        };
        let item = create_meal_item(&store, user, meal_id, req).await.unwrap();
        assert!(close(item.nutrition.calories, 130.0));

        // the recipe changes; the frozen snapshot does not
        update_recipe(
            &store,
            user,
            recipe.id,
            crate::recipes::dto::UpdateRecipeRequest {
                ingredients: Some(vec![Ingredient {
                    food_id: banana.id,
                    quantity: Quantity::new(100.0).unwrap(),
                    unit: Unit::G,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let same = update_meal_item(
            &store,
            user,
            item.id,
            UpdateMealItemRequest {
                observation: Some("tasty".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(close(same.nutrition.calories, 130.0));
        assert_eq!(same.observation.as_deref(), Some("tasty"));

        let doubled = update_meal_item(
            &store,
            user,
            item.id,
            UpdateMealItemRequest {
                quantity: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(close(doubled.nutrition.calories, 178.0));
    }

    #[tokio::test]
    async fn update_fails_when_source_is_gone() {
        let (store, user, meal_id) = setup().await;
        let rice = food_named(&store, "rice").await;
        let recipe = create_recipe(
            &store,
            user,
            CreateRecipeRequest {
                name: "Bowl".into(),
                description: None,
                category: None,
                servings: 1,
                prep_time_minutes: None,
                ingredients: vec![Ingredient {
                    food_id: rice.id,
                    quantity: Quantity::new(100.0).unwrap(),
                    unit: Unit::G,
                }],
                instructions: None,
                is_public: None,
                tags: None,
            },
        )
        .await
        .unwrap();
        let req = CreateMealItemRequest {
            food_id: None,
            recipe_id: Some(recipe.id),
            quantity: 1.0,
            unit: Unit::Portion,
            observation: None,
        };
        let item = create_meal_item(&store, user, meal_id, req).await.unwrap();
        crate::recipes::services::delete_recipe(&store, user, recipe.id)
            .await
            .unwrap();

        let err = update_meal_item(
            &store,
            user,
            item.id,
            UpdateMealItemRequest {
                quantity: Some(3.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::ReferenceNotFound { kind: EntityKind::Recipe, .. }));
    }

    #[tokio::test]
    async fn deleting_meal_removes_its_items() {
        let (store, user, meal_id) = setup().await;
        let banana = food_named(&store, "banana").await;
        let item = create_meal_item(&store, user, meal_id, food_item(banana.id, 100.0, Unit::G))
            .await
            .unwrap();

        delete_meal(&store, user, meal_id).await.unwrap();
        assert!(store.meal_by_id(meal_id).await.unwrap().is_none());
        assert!(store.meal_item_by_id(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn items_of_foreign_meals_are_hidden() {
        let (store, user, meal_id) = setup().await;
        let banana = food_named(&store, "banana").await;
        let item = create_meal_item(&store, user, meal_id, food_item(banana.id, 100.0, Unit::G))
            .await
            .unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            list_meal_items(&store, stranger, meal_id).await,
            Err(EngineError::ParentNotFound(_))
        ));
        assert!(matches!(
            delete_meal_item(&store, stranger, item.id).await,
            Err(EngineError::NotFound { kind: EntityKind::MealItem, .. })
        ));
        assert_eq!(get_meal_item(&store, user, item.id).await.unwrap(), item);
    }
}
