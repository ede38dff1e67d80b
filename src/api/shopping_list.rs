use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::auth::AuthAccount;
use super::{ApiError, AppState};
use crate::services::ShoppingListError;

impl From<ShoppingListError> for ApiError {
    fn from(err: ShoppingListError) -> Self {
        match err {
            ShoppingListError::Database(msg) => ApiError::DatabaseError(msg),
            ShoppingListError::Render(msg) | ShoppingListError::Internal(msg) => {
                ApiError::InternalError(msg)
            }
        }
    }
}

/// GET /recipes/download_shopping_cart
pub async fn download_shopping_cart(
    State(state): State<Arc<AppState>>,
    AuthAccount(user): AuthAccount,
) -> Result<Response, ApiError> {
    let document = state.shopping_list().render(user).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        document.file_name
    ))
    .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(document.content_type),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.body,
    )
        .into_response())
}
