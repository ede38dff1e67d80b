use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::IngredientId;
use crate::models::catalog::Ingredient;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Name prefix
    pub name: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<ApiResponse<Vec<Ingredient>>>, ApiError> {
    let prefix = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let ingredients = state
        .store()
        .list_ingredients(prefix)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(ingredients)))
}

pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Ingredient>>, ApiError> {
    let ingredient = state
        .store()
        .get_ingredient(IngredientId::new(id))
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Ingredient", id))?;

    Ok(Json(ApiResponse::success(ingredient)))
}
