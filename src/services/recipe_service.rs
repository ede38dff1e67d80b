//! Domain service for writing and reading recipes.
//!
//! Validation of drafts and patches lives here as pure functions so it can be
//! checked without a database; existence checks against the store and the
//! transactional write happen in the implementation.

use std::collections::HashSet;

use crate::domain::{AccountId, RecipeId, TagId, Viewer};
use crate::models::page::{Page, PageRequest};
use crate::models::recipe::{
    IngredientInput, IngredientLine, NewRecipe, RecipeDetail, RecipeDraft, RecipeFilter,
    RecipePatch, RecipeUpdate,
};
use thiserror::Error;

pub const MAX_NAME_LENGTH: usize = 200;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecipeError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for recipes.
#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    /// Validates the draft and writes the recipe, its ingredient lines and its
    /// tags as one unit.
    ///
    /// # Errors
    ///
    /// - Returns [`RecipeError::Validation`] for an invalid draft; nothing is written
    /// - Returns [`RecipeError::Database`] on store failures
    async fn create_recipe(
        &self,
        author: AccountId,
        draft: RecipeDraft,
    ) -> Result<RecipeDetail, RecipeError>;

    /// Applies a partial update. Supplied tags or ingredients replace the stored sets.
    ///
    /// # Errors
    ///
    /// - Returns [`RecipeError::NotFound`] if the recipe does not exist
    /// - Returns [`RecipeError::Forbidden`] unless `actor` is the author or an admin
    /// - Returns [`RecipeError::Validation`] for an invalid patch
    async fn update_recipe(
        &self,
        actor: AccountId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeDetail, RecipeError>;

    /// Deletes a recipe and everything hanging off it.
    ///
    /// # Errors
    ///
    /// - Returns [`RecipeError::NotFound`] if the recipe does not exist
    /// - Returns [`RecipeError::Forbidden`] unless `actor` is the author or an admin
    async fn delete_recipe(&self, actor: AccountId, id: RecipeId) -> Result<(), RecipeError>;

    /// Fetches one recipe annotated for the viewer.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] if the recipe does not exist.
    async fn get_recipe(&self, id: RecipeId, viewer: Viewer) -> Result<RecipeDetail, RecipeError>;

    /// Lists one page of the catalog, newest first.
    async fn list_recipes(
        &self,
        filter: RecipeFilter,
        viewer: Viewer,
        page: PageRequest,
    ) -> Result<Page<RecipeDetail>, RecipeError>;
}

/// Checks the draft and converts it to a writable recipe.
///
/// Existence of the referenced tags and ingredients is checked separately.
pub fn validate_draft(author: AccountId, draft: RecipeDraft) -> Result<NewRecipe, RecipeError> {
    let name = validate_name(draft.name)?;
    let cooking_time = validate_cooking_time(draft.cooking_time)?;
    let tag_ids = validate_tag_ids(&draft.tags)?;
    let lines = validate_ingredients(&draft.ingredients)?;

    Ok(NewRecipe {
        author_id: author,
        name,
        text: draft.text,
        cooking_time,
        image: draft.image,
        tag_ids,
        lines,
    })
}

/// Checks every supplied field of a patch.
pub fn validate_patch(patch: RecipePatch) -> Result<RecipeUpdate, RecipeError> {
    Ok(RecipeUpdate {
        name: patch.name.map(validate_name).transpose()?,
        text: patch.text,
        cooking_time: patch.cooking_time.map(validate_cooking_time).transpose()?,
        image: patch.image,
        tag_ids: patch.tags.as_deref().map(validate_tag_ids).transpose()?,
        lines: patch
            .ingredients
            .as_deref()
            .map(validate_ingredients)
            .transpose()?,
    })
}

pub fn validate_name(name: String) -> Result<String, RecipeError> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(RecipeError::validation("invalid name"));
    }
    Ok(name)
}

pub fn validate_cooking_time(minutes: i64) -> Result<i32, RecipeError> {
    if minutes < 1 {
        return Err(RecipeError::validation("invalid cooking time"));
    }
    i32::try_from(minutes).map_err(|_| RecipeError::validation("invalid cooking time"))
}

pub fn validate_tag_ids(tags: &[TagId]) -> Result<Vec<TagId>, RecipeError> {
    if tags.is_empty() {
        return Err(RecipeError::validation("missing tags"));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    if !tags.iter().all(|id| seen.insert(*id)) {
        return Err(RecipeError::validation("duplicate tag"));
    }

    Ok(tags.to_vec())
}

pub fn validate_ingredients(inputs: &[IngredientInput]) -> Result<Vec<IngredientLine>, RecipeError> {
    if inputs.is_empty() {
        return Err(RecipeError::validation("missing ingredients"));
    }

    let mut seen = HashSet::with_capacity(inputs.len());
    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        if !seen.insert(input.id) {
            return Err(RecipeError::validation("duplicate ingredient"));
        }
        lines.push(IngredientLine {
            ingredient_id: input.id,
            amount: parse_amount(&input.amount)?,
        });
    }

    Ok(lines)
}

/// Accepts a JSON integer or a decimal integer string; the result must be
/// positive and fit the amount column.
pub fn parse_amount(value: &serde_json::Value) -> Result<i32, RecipeError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .filter(|amount| *amount > 0)
        .and_then(|amount| i32::try_from(amount).ok())
        .ok_or_else(|| RecipeError::validation("invalid amount"))
}
