use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthAccount;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::{AccountId, AddOutcome, RecipeId, RelationKind, RemoveOutcome};
use crate::models::account::SubscribedAuthor;
use crate::models::recipe::RecipeSummary;
use crate::services::RelationError;

impl From<RelationError> for ApiError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            RelationError::Validation(msg) => ApiError::ValidationError(msg),
            RelationError::Database(msg) => ApiError::DatabaseError(msg),
            RelationError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<u64>,
}

async fn add_recipe_relation(
    state: &AppState,
    kind: RelationKind,
    user: AccountId,
    id: i32,
) -> Result<(StatusCode, Json<ApiResponse<RecipeSummary>>), ApiError> {
    match state.relation_service().add(kind, user, id).await? {
        AddOutcome::Created => {
            let recipe = state
                .store()
                .get_recipe_model(RecipeId::new(id))
                .await?
                .ok_or_else(|| ApiError::not_found("Recipe", id))?;

            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(RecipeSummary::from(recipe))),
            ))
        }
        AddOutcome::AlreadyExists => Err(ApiError::conflict(kind.already_exists_message())),
    }
}

async fn remove_relation(
    state: &AppState,
    kind: RelationKind,
    user: AccountId,
    id: i32,
) -> Result<StatusCode, ApiError> {
    match state.relation_service().remove(kind, user, id).await? {
        RemoveOutcome::Removed => Ok(StatusCode::NO_CONTENT),
        RemoveOutcome::NotPresent => Err(ApiError::conflict(kind.not_present_message())),
    }
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeSummary>>), ApiError> {
    add_recipe_relation(&state, RelationKind::Favorite, user, id).await
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove_relation(&state, RelationKind::Favorite, user, id).await
}

pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeSummary>>), ApiError> {
    add_recipe_relation(&state, RelationKind::Cart, user, id).await
}

pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove_relation(&state, RelationKind::Cart, user, id).await
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
    Query(query): Query<SubscribeQuery>,
) -> Result<(StatusCode, Json<ApiResponse<SubscribedAuthor>>), ApiError> {
    let kind = RelationKind::Subscription;

    match state.relation_service().add(kind, user, id).await? {
        AddOutcome::Created => {
            let author = state
                .account_service()
                .get_subscribed_author(user, AccountId::new(id), query.recipes_limit)
                .await
                .map_err(ApiError::from)?;

            Ok((StatusCode::CREATED, Json(ApiResponse::success(author))))
        }
        AddOutcome::AlreadyExists => Err(ApiError::conflict(kind.already_exists_message())),
    }
}

pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove_relation(&state, RelationKind::Subscription, user, id).await
}

