//! Domain service for the idempotent toggle relations: favorites, the
//! shopping cart and author subscriptions.

use crate::domain::{AccountId, AddOutcome, RelationKind, RemoveOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelationError {
    #[must_use]
    pub fn target_not_found(kind: RelationKind, target: i32) -> Self {
        if kind.targets_recipe() {
            Self::NotFound(format!("recipe {target}"))
        } else {
            Self::NotFound(format!("account {target}"))
        }
    }
}

impl From<sea_orm::DbErr> for RelationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RelationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One contract for all three relation kinds. `target` is a recipe id for
/// favorites and the cart, and an account id for subscriptions.
#[async_trait::async_trait]
pub trait RelationService: Send + Sync {
    /// Creates the (actor, target) row unless it exists.
    ///
    /// # Errors
    ///
    /// - Returns [`RelationError::Validation`] when an account subscribes to itself
    /// - Returns [`RelationError::NotFound`] if the target does not exist
    async fn add(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<AddOutcome, RelationError>;

    /// Deletes the (actor, target) row if present.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError::NotFound`] if the target does not exist.
    async fn remove(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<RemoveOutcome, RelationError>;
}
