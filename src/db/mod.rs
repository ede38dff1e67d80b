use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{AccountId, AddOutcome, IngredientId, RecipeId, RelationKind, TagId};
use crate::entities::recipes;
use crate::models::account::{Account, NewAccount};
use crate::models::catalog::{Ingredient, NewIngredient, NewTag, Tag};
use crate::models::page::PageRequest;
use crate::models::recipe::{NewRecipe, RecipeDetail, RecipeFilter, RecipeSummary, RecipeUpdate};
use crate::models::shopping_list::ShoppingListItem;

pub mod migrator;
pub mod repositories;

pub use repositories::ingredient::ImportReport;

/// Constraint violation carried by a repository error, if any.
#[must_use]
pub fn sql_error(err: &anyhow::Error) -> Option<SqlErr> {
    err.downcast_ref::<DbErr>().and_then(DbErr::sql_err)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        // Each pooled connection to a private in-memory database would see its own
        // copy, and shared-cache mode locks whole tables under concurrent writers.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn ingredient_repo(&self) -> repositories::ingredient::IngredientRepository {
        repositories::ingredient::IngredientRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    fn relation_repo(&self) -> repositories::relation::RelationRepository {
        repositories::relation::RelationRepository::new(self.conn.clone())
    }

    fn shopping_list_repo(&self) -> repositories::shopping_list::ShoppingListRepository {
        repositories::shopping_list::ShoppingListRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn create_account(&self, account: &NewAccount, api_key: &str) -> Result<Account> {
        self.account_repo().create(account, api_key).await
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        self.account_repo().get(id).await
    }

    pub async fn account_exists(&self, id: AccountId) -> Result<bool> {
        self.account_repo().exists(id).await
    }

    pub async fn get_account_by_api_key(&self, api_key: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_api_key(api_key).await
    }

    pub async fn list_subscribed_authors(
        &self,
        subscriber: AccountId,
        page: PageRequest,
    ) -> Result<(Vec<Account>, u64)> {
        self.account_repo()
            .list_subscribed_page(subscriber, page)
            .await
    }

    // ========== Ingredients & tags ==========

    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        self.ingredient_repo().list(name_prefix).await
    }

    pub async fn get_ingredient(&self, id: IngredientId) -> Result<Option<Ingredient>> {
        self.ingredient_repo().get(id).await
    }

    pub async fn existing_ingredient_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashSet<IngredientId>> {
        self.ingredient_repo().existing_ids(ids).await
    }

    pub async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<ImportReport> {
        self.ingredient_repo().import_many(items).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.tag_repo().list().await
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Option<Tag>> {
        self.tag_repo().get(id).await
    }

    pub async fn existing_tag_ids(&self, ids: &[TagId]) -> Result<HashSet<TagId>> {
        self.tag_repo().existing_ids(ids).await
    }

    pub async fn seed_tags(&self, tags: Vec<NewTag>) -> Result<u64> {
        self.tag_repo().seed(tags).await
    }

    // ========== Recipes ==========

    pub async fn create_recipe(&self, recipe: NewRecipe) -> Result<RecipeId> {
        self.recipe_repo().create(recipe).await
    }

    pub async fn update_recipe(&self, id: RecipeId, update: RecipeUpdate) -> Result<bool> {
        self.recipe_repo().update(id, update).await
    }

    pub async fn delete_recipe(&self, id: RecipeId) -> Result<bool> {
        self.recipe_repo().delete(id).await
    }

    pub async fn get_recipe_model(&self, id: RecipeId) -> Result<Option<recipes::Model>> {
        self.recipe_repo().get_model(id).await
    }

    pub async fn list_recipes_page(
        &self,
        filter: &RecipeFilter,
        viewer: Option<AccountId>,
        page: PageRequest,
    ) -> Result<(Vec<recipes::Model>, u64)> {
        self.recipe_repo().list_page(filter, viewer, page).await
    }

    pub async fn load_recipe_details(
        &self,
        models: Vec<recipes::Model>,
        viewer: Option<AccountId>,
    ) -> Result<Vec<RecipeDetail>> {
        self.recipe_repo().load_details(models, viewer).await
    }

    pub async fn recipe_summaries_by_authors(
        &self,
        author_ids: &[AccountId],
        per_author: Option<u64>,
    ) -> Result<HashMap<AccountId, (Vec<RecipeSummary>, u64)>> {
        self.recipe_repo()
            .summaries_by_authors(author_ids, per_author)
            .await
    }

    // ========== Toggle relations ==========

    pub async fn add_relation(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<AddOutcome> {
        self.relation_repo().insert(kind, actor, target).await
    }

    pub async fn remove_relation(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<bool> {
        self.relation_repo().delete(kind, actor, target).await
    }

    pub async fn relation_exists(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<bool> {
        let found = self
            .relation_repo()
            .viewer_targets(kind, actor, &[target])
            .await?;
        Ok(found.contains(&target))
    }

    // ========== Shopping list ==========

    pub async fn shopping_list(&self, user: AccountId) -> Result<Vec<ShoppingListItem>> {
        self.shopping_list_repo().aggregate(user).await
    }
}
