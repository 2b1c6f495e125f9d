use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EntityKind};
use crate::foods::repo_types::{Food, FoodQuery};
use crate::nutrition::{units, Quantity, Unit};
use crate::store::{FoodStore, Store};

/// Looks up a food the caller may see. Private foods of other users read as missing.
#[instrument(skip(store))]
pub async fn get_food(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Food, EngineError> {
    match store.food_by_id(id).await? {
        Some(food) if food.visible_to(user_id) => Ok(food),
        _ => Err(EngineError::not_found(EntityKind::Food, id)),
    }
}

#[instrument(skip(store))]
pub async fn search_foods(store: &dyn Store, query: &FoodQuery) -> Result<Vec<Food>, EngineError> {
    let foods = store.search_foods(query).await?;
    debug!(count = foods.len(), "food search");
    Ok(foods)
}

/// Gram-equivalent amount of `quantity` `unit` of this food.
pub fn reference_amount(food: &Food, quantity: Quantity, unit: Unit) -> Result<Quantity, EngineError> {
    units::food_reference_amount(quantity, unit, &food.conversion_factors)?.ok_or(
        EngineError::UnsupportedUnit {
            unit,
            kind: EntityKind::Food,
            id: food.id,
        },
    )
}

/// Loads a JSON array of foods into the store. Used to give the in-memory
/// backend its reference data.
pub async fn seed_from_file(store: &dyn Store, path: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read food seed {}", path.display()))?;
    let foods: Vec<Food> =
        serde_json::from_str(&raw).with_context(|| format!("parse food seed {}", path.display()))?;
    let count = foods.len();
    for food in foods {
        store.upsert_food(food).await?;
    }
    info!(count, path = %path.display(), "foods seeded");
    Ok(count)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{banana, rice};
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn private_food_of_another_user_is_hidden() {
        let owner = Uuid::new_v4();
        let mut secret = banana();
        secret.is_public = false;
        secret.creator_user_id = Some(owner);
        let store = InMemoryStore::with_foods(vec![secret.clone()]);

        assert!(get_food(&store, owner, secret.id).await.is_ok());
        let err = get_food(&store, Uuid::new_v4(), secret.id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: EntityKind::Food, .. }));
    }

    #[tokio::test]
    async fn search_filters_by_text_and_tags() {
        let store = InMemoryStore::with_foods(vec![banana(), rice()]);
        let hits = search_foods(
            &store,
            &FoodQuery {
                text: Some("RICE".into()),
                limit: 50,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "White rice, cooked");

        let hits = search_foods(
            &store,
            &FoodQuery {
                tags: vec!["Snack".into()],
                limit: 50,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Banana");
    }

    #[test]
    fn missing_conversion_factor_is_reported() {
        let b = banana();
        let q = Quantity::new(2.0).unwrap();
        assert_eq!(reference_amount(&b, q, Unit::Unit).unwrap().get(), 236.0);
        assert!(matches!(
            reference_amount(&b, q, Unit::Cup),
            Err(EngineError::UnsupportedUnit { unit: Unit::Cup, .. })
        ));
    }

    #[test]
    fn huge_amount_in_a_supported_unit_is_a_bad_quantity() {
        let b = banana();
        let q = Quantity::new(f64::MAX / 2.0).unwrap();
        assert!(matches!(
            reference_amount(&b, q, Unit::Unit),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[tokio::test]
    async fn seed_file_loads_foods() {
        let path = std::env::temp_dir().join(format!("foods-{}.json", Uuid::new_v4()));
        let json = serde_json::to_string(&vec![banana(), rice()]).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let store = InMemoryStore::new();
        assert_eq!(seed_from_file(&store, &path).await.unwrap(), 2);
        let _ = tokio::fs::remove_file(&path).await;

        let all = store
            .search_foods(&FoodQuery { limit: 10, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
