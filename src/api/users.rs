use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthAccount;
use super::validation::resolve_page;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::{AccountId, Viewer};
use crate::models::account::{Account, AuthorProfile, SubscribedAuthor};
use crate::models::page::Page;
use crate::services::{AccountError, RegisteredAccount, Registration};

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => ApiError::not_found("User", id),
            AccountError::Validation(msg) => ApiError::ValidationError(msg),
            AccountError::Conflict(msg) => ApiError::Conflict(msg),
            AccountError::Database(msg) => ApiError::DatabaseError(msg),
            AccountError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub recipes_limit: Option<u64>,
}

/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredAccount>>), ApiError> {
    let account = state
        .account_service()
        .register(registration, false)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// GET /users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthAccount(id): AuthAccount,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = state.account_service().get_account(id).await?;
    Ok(Json(ApiResponse::success(account)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AuthorProfile>>, ApiError> {
    let profile = state
        .account_service()
        .get_profile(AccountId::new(id), viewer)
        .await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// GET /users/subscriptions
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    AuthAccount(id): AuthAccount,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<ApiResponse<Page<SubscribedAuthor>>>, ApiError> {
    let catalog = state.config().read().await.catalog.clone();
    let page = resolve_page(query.page, query.limit, &catalog)?;

    let authors = state
        .account_service()
        .list_subscriptions(id, page, query.recipes_limit)
        .await?;

    Ok(Json(ApiResponse::success(authors)))
}
