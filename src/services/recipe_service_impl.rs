//! `SeaORM` implementation of the `RecipeService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{AccountId, RecipeId, TagId, Viewer};
use crate::models::page::{Page, PageRequest};
use crate::models::recipe::{IngredientLine, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch};
use crate::services::recipe_service::{
    RecipeError, RecipeService, validate_draft, validate_patch,
};

pub struct SeaOrmRecipeService {
    store: Store,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_tags_exist(&self, tag_ids: &[TagId]) -> Result<(), RecipeError> {
        let found = self.store.existing_tag_ids(tag_ids).await?;
        if tag_ids.iter().any(|id| !found.contains(id)) {
            return Err(RecipeError::validation("unknown tag"));
        }
        Ok(())
    }

    async fn ensure_ingredients_exist(&self, lines: &[IngredientLine]) -> Result<(), RecipeError> {
        let ids: Vec<_> = lines.iter().map(|line| line.ingredient_id).collect();
        let found = self.store.existing_ingredient_ids(&ids).await?;
        if ids.iter().any(|id| !found.contains(id)) {
            return Err(RecipeError::validation("unknown ingredient"));
        }
        Ok(())
    }

    /// Only the author or an admin may change a recipe.
    async fn authorize_change(&self, actor: AccountId, id: RecipeId) -> Result<(), RecipeError> {
        let recipe = self
            .store
            .get_recipe_model(id)
            .await?
            .ok_or(RecipeError::NotFound(id))?;

        if recipe.author_id == actor.value() {
            return Ok(());
        }

        let is_admin = self
            .store
            .get_account(actor)
            .await?
            .is_some_and(|account| account.is_admin);

        if is_admin {
            Ok(())
        } else {
            Err(RecipeError::Forbidden(
                "only the author or an admin may change this recipe".to_string(),
            ))
        }
    }

    async fn load(&self, id: RecipeId, viewer: Option<AccountId>) -> Result<RecipeDetail, RecipeError> {
        let model = self
            .store
            .get_recipe_model(id)
            .await?
            .ok_or(RecipeError::NotFound(id))?;

        self.store
            .load_recipe_details(vec![model], viewer)
            .await?
            .pop()
            .ok_or(RecipeError::NotFound(id))
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn create_recipe(
        &self,
        author: AccountId,
        draft: RecipeDraft,
    ) -> Result<RecipeDetail, RecipeError> {
        let recipe = validate_draft(author, draft)?;
        self.ensure_tags_exist(&recipe.tag_ids).await?;
        self.ensure_ingredients_exist(&recipe.lines).await?;

        let id = self.store.create_recipe(recipe).await?;
        info!(recipe_id = %id, author_id = %author, "Recipe created");

        self.load(id, Some(author)).await
    }

    async fn update_recipe(
        &self,
        actor: AccountId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeDetail, RecipeError> {
        self.authorize_change(actor, id).await?;

        let update = validate_patch(patch)?;
        if let Some(tag_ids) = &update.tag_ids {
            self.ensure_tags_exist(tag_ids).await?;
        }
        if let Some(lines) = &update.lines {
            self.ensure_ingredients_exist(lines).await?;
        }

        if !self.store.update_recipe(id, update).await? {
            return Err(RecipeError::NotFound(id));
        }
        info!(recipe_id = %id, actor_id = %actor, "Recipe updated");

        self.load(id, Some(actor)).await
    }

    async fn delete_recipe(&self, actor: AccountId, id: RecipeId) -> Result<(), RecipeError> {
        self.authorize_change(actor, id).await?;

        if !self.store.delete_recipe(id).await? {
            return Err(RecipeError::NotFound(id));
        }
        info!(recipe_id = %id, actor_id = %actor, "Recipe deleted");

        Ok(())
    }

    async fn get_recipe(&self, id: RecipeId, viewer: Viewer) -> Result<RecipeDetail, RecipeError> {
        self.load(id, viewer.account_id()).await
    }

    async fn list_recipes(
        &self,
        filter: RecipeFilter,
        viewer: Viewer,
        page: PageRequest,
    ) -> Result<Page<RecipeDetail>, RecipeError> {
        let viewer = viewer.account_id();
        let (models, count) = self.store.list_recipes_page(&filter, viewer, page).await?;
        let details = self.store.load_recipe_details(models, viewer).await?;

        Ok(Page::new(details, count, page))
    }
}
