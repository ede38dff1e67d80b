use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::AuthAccount;
use super::validation::{parse_bool, parse_number, resolve_page};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::{AccountId, RecipeId, Viewer};
use crate::models::page::Page;
use crate::models::recipe::{RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch};
use crate::services::RecipeError;

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::NotFound(id) => ApiError::not_found("Recipe", id),
            RecipeError::Validation(msg) => ApiError::ValidationError(msg),
            RecipeError::Forbidden(msg) => ApiError::Forbidden(msg),
            RecipeError::Database(msg) => ApiError::DatabaseError(msg),
            RecipeError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Query string of `GET /recipes`. `tags` may repeat, so the raw pairs are
/// collected instead of deserializing into a struct.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecipeListQuery {
    pub filter: RecipeFilter,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl RecipeListQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "author" => {
                    query.filter.author = Some(AccountId::new(parse_number(&key, &value)?));
                }
                "is_favorited" => query.filter.is_favorited = parse_bool(&key, &value)?,
                "is_in_shopping_cart" => {
                    query.filter.is_in_shopping_cart = parse_bool(&key, &value)?;
                }
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() && !query.filter.tags.iter().any(|t| t == slug) {
                        query.filter.tags.push(slug.to_string());
                    }
                }
                "page" => query.page = Some(parse_number(&key, &value)?),
                "limit" => query.limit = Some(parse_number(&key, &value)?),
                _ => {}
            }
        }

        Ok(query)
    }
}

pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Page<RecipeDetail>>>, ApiError> {
    let query = RecipeListQuery::from_pairs(pairs)?;
    let catalog = state.config().read().await.catalog.clone();
    let page = resolve_page(query.page, query.limit, &catalog)?;

    let recipes = state
        .recipe_service()
        .list_recipes(query.filter, viewer, page)
        .await?;

    Ok(Json(ApiResponse::success(recipes)))
}

pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ApiError> {
    let recipe = state
        .recipe_service()
        .get_recipe(RecipeId::new(id), viewer)
        .await?;

    Ok(Json(ApiResponse::success(recipe)))
}

pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    AuthAccount(author): AuthAccount,
    Json(draft): Json<RecipeDraft>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeDetail>>), ApiError> {
    let recipe = state.recipe_service().create_recipe(author, draft).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(recipe))))
}

pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    AuthAccount(actor): AuthAccount,
    Path(id): Path<i32>,
    Json(patch): Json<RecipePatch>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ApiError> {
    let recipe = state
        .recipe_service()
        .update_recipe(actor, RecipeId::new(id), patch)
        .await?;

    Ok(Json(ApiResponse::success(recipe)))
}

pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    AuthAccount(actor): AuthAccount,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .recipe_service()
        .delete_recipe(actor, RecipeId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
