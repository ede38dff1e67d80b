use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::{AccountId, Viewer};

/// Resolves the caller and stores a [`Viewer`] in the request extensions.
///
/// Keys are read from:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Token <api_key>` or `Authorization: Bearer <api_key>`
///
/// No key means an anonymous viewer. A key that matches no account is
/// rejected outright instead of silently downgrading to anonymous.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let viewer = match extract_api_key(request.headers()) {
        Some(key) => {
            let account = state
                .account_service()
                .authenticate(&key)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?
                .ok_or_else(|| ApiError::unauthorized("Invalid API key"))?;

            tracing::Span::current().record("user_id", account.value());
            Viewer::Account(account)
        }
        None => Viewer::Anonymous,
    };

    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
        && !key_str.trim().is_empty()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str
            .strip_prefix("Token ")
            .or_else(|| auth_str.strip_prefix("Bearer "))
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }

    None
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Viewer>()
            .copied()
            .unwrap_or_default())
    }
}

/// An authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthAccount(pub AccountId);

impl<S> FromRequestParts<S> for AuthAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        viewer
            .account_id()
            .map(AuthAccount)
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))
    }
}
