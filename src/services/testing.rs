//! Seeded in-memory store shared by the service tests.

use crate::db::Store;
use crate::db::repositories::account::generate_api_key;
use crate::domain::{AccountId, IngredientId, TagId};
use crate::models::account::NewAccount;
use crate::models::catalog::{NewIngredient, default_tags};

pub struct Fixture {
    pub store: Store,
    pub alice: AccountId,
    pub bob: AccountId,
    pub admin: AccountId,
    pub breakfast: TagId,
    pub lunch: TagId,
    pub dinner: TagId,
    pub flour: IngredientId,
    pub salt: IngredientId,
    pub sugar: IngredientId,
    pub milk: IngredientId,
}

pub async fn fixture() -> Fixture {
    seeded(Store::new("sqlite::memory:").await.unwrap()).await
}

/// A fixture backed by a fresh temp-file database with a multi-connection pool,
/// for tests that need writes to overlap at the database.
pub async fn pooled_fixture() -> Fixture {
    let db_path =
        std::env::temp_dir().join(format!("cookbook-pool-test-{}.db", uuid::Uuid::new_v4()));
    let store = Store::with_pool_options(&format!("sqlite:{}", db_path.display()), 4, 2)
        .await
        .unwrap();
    seeded(store).await
}

async fn seeded(store: Store) -> Fixture {

    let alice = account(&store, "alice", false).await;
    let bob = account(&store, "bob", false).await;
    let admin = account(&store, "root", true).await;

    store.seed_tags(default_tags()).await.unwrap();
    let tags = store.list_tags().await.unwrap();
    let tag = |slug: &str| tags.iter().find(|t| t.slug == slug).unwrap().id;

    store
        .import_ingredients(vec![
            ingredient("Flour", "g"),
            ingredient("Salt", "g"),
            ingredient("Sugar", "g"),
            ingredient("Milk", "ml"),
        ])
        .await
        .unwrap();
    let ingredients = store.list_ingredients(None).await.unwrap();
    let ingredient_id = |name: &str| ingredients.iter().find(|i| i.name == name).unwrap().id;

    Fixture {
        alice,
        bob,
        admin,
        breakfast: tag("breakfast"),
        lunch: tag("lunch"),
        dinner: tag("dinner"),
        flour: ingredient_id("Flour"),
        salt: ingredient_id("Salt"),
        sugar: ingredient_id("Sugar"),
        milk: ingredient_id("Milk"),
        store,
    }
}

async fn account(store: &Store, username: &str, is_admin: bool) -> AccountId {
    let account = NewAccount {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: username.to_string(),
        last_name: "Tester".to_string(),
        is_admin,
    };
    store
        .create_account(&account, &generate_api_key())
        .await
        .unwrap()
        .id
}

fn ingredient(name: &str, unit: &str) -> NewIngredient {
    NewIngredient {
        name: name.to_string(),
        measurement_unit: unit.to_string(),
    }
}
