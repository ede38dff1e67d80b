//! `SeaORM` implementation of the `RelationService` trait.

use async_trait::async_trait;
use sea_orm::SqlErr;
use tracing::debug;

use crate::db::{Store, sql_error};
use crate::domain::{AccountId, AddOutcome, RecipeId, RelationKind, RemoveOutcome};
use crate::services::relation_service::{RelationError, RelationService};

pub struct SeaOrmRelationService {
    store: Store,
}

impl SeaOrmRelationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_target_exists(
        &self,
        kind: RelationKind,
        target: i32,
    ) -> Result<(), RelationError> {
        let exists = if kind.targets_recipe() {
            self.store
                .get_recipe_model(RecipeId::new(target))
                .await?
                .is_some()
        } else {
            self.store.account_exists(AccountId::new(target)).await?
        };

        if exists {
            Ok(())
        } else {
            Err(RelationError::target_not_found(kind, target))
        }
    }
}

#[async_trait]
impl RelationService for SeaOrmRelationService {
    async fn add(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<AddOutcome, RelationError> {
        if kind == RelationKind::Subscription && actor.value() == target {
            return Err(RelationError::Validation("self-subscription".to_string()));
        }

        self.ensure_target_exists(kind, target).await?;

        let outcome = match self.store.add_relation(kind, actor, target).await {
            Ok(outcome) => outcome,
            Err(err) => match sql_error(&err) {
                // The target disappeared between the existence check and the insert.
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    return Err(RelationError::target_not_found(kind, target));
                }
                _ => return Err(err.into()),
            },
        };

        debug!(%kind, actor_id = %actor, target, ?outcome, "Relation add");
        Ok(outcome)
    }

    async fn remove(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<RemoveOutcome, RelationError> {
        self.ensure_target_exists(kind, target).await?;

        let outcome = if self.store.remove_relation(kind, actor, target).await? {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotPresent
        };

        debug!(%kind, actor_id = %actor, target, ?outcome, "Relation remove");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::{IngredientInput, RecipeDraft};
    use crate::services::recipe_service::RecipeService;
    use crate::services::recipe_service_impl::SeaOrmRecipeService;
    use crate::services::testing::{Fixture, fixture, pooled_fixture};
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::json;
    use std::sync::Arc;

    async fn recipe(fx: &Fixture) -> i32 {
        SeaOrmRecipeService::new(fx.store.clone())
            .create_recipe(
                fx.alice,
                RecipeDraft {
                    name: "toast".to_string(),
                    text: "Toast the bread.".to_string(),
                    cooking_time: 5,
                    image: "images/toast.png".to_string(),
                    tags: vec![fx.breakfast],
                    ingredients: vec![IngredientInput {
                        id: fx.flour,
                        amount: json!(50),
                    }],
                },
            )
            .await
            .unwrap()
            .id
            .value()
    }

    #[tokio::test]
    async fn add_twice_creates_one_row() {
        let fx = fixture().await;
        let target = recipe(&fx).await;
        let service = SeaOrmRelationService::new(fx.store.clone());

        for kind in [RelationKind::Favorite, RelationKind::Cart] {
            assert_eq!(
                service.add(kind, fx.bob, target).await.unwrap(),
                AddOutcome::Created
            );
            assert_eq!(
                service.add(kind, fx.bob, target).await.unwrap(),
                AddOutcome::AlreadyExists
            );
            assert!(fx.store.relation_exists(kind, fx.bob, target).await.unwrap());
        }

        assert_eq!(
            service
                .add(RelationKind::Subscription, fx.bob, fx.alice.value())
                .await
                .unwrap(),
            AddOutcome::Created
        );
        assert_eq!(
            service
                .add(RelationKind::Subscription, fx.bob, fx.alice.value())
                .await
                .unwrap(),
            AddOutcome::AlreadyExists
        );
    }

    #[tokio::test]
    async fn remove_without_add_is_not_present() {
        let fx = fixture().await;
        let target = recipe(&fx).await;
        let service = SeaOrmRelationService::new(fx.store.clone());

        assert_eq!(
            service
                .remove(RelationKind::Favorite, fx.bob, target)
                .await
                .unwrap(),
            RemoveOutcome::NotPresent
        );
        assert_eq!(
            service
                .remove(RelationKind::Subscription, fx.bob, fx.alice.value())
                .await
                .unwrap(),
            RemoveOutcome::NotPresent
        );

        service.add(RelationKind::Cart, fx.bob, target).await.unwrap();
        assert_eq!(
            service.remove(RelationKind::Cart, fx.bob, target).await.unwrap(),
            RemoveOutcome::Removed
        );
        assert!(
            !fx.store
                .relation_exists(RelationKind::Cart, fx.bob, target)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn self_subscription_always_fails() {
        let fx = fixture().await;
        let service = SeaOrmRelationService::new(fx.store.clone());

        let err = service
            .add(RelationKind::Subscription, fx.alice, fx.alice.value())
            .await
            .unwrap_err();
        assert!(matches!(err, RelationError::Validation(ref r) if r == "self-subscription"));
        assert!(
            !fx.store
                .relation_exists(RelationKind::Subscription, fx.alice, fx.alice.value())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn missing_targets_are_not_found() {
        let fx = fixture().await;
        let service = SeaOrmRelationService::new(fx.store.clone());

        let err = service
            .add(RelationKind::Favorite, fx.bob, 4242)
            .await
            .unwrap_err();
        assert!(matches!(err, RelationError::NotFound(_)));

        let err = service
            .add(RelationKind::Subscription, fx.bob, 4242)
            .await
            .unwrap_err();
        assert!(matches!(err, RelationError::NotFound(_)));

        let err = service
            .remove(RelationKind::Cart, fx.bob, 4242)
            .await
            .unwrap_err();
        assert!(matches!(err, RelationError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_create_exactly_once() {
        let fx = pooled_fixture().await;
        let target = recipe(&fx).await;
        let service = Arc::new(SeaOrmRelationService::new(fx.store.clone()));

        let barrier = Arc::new(tokio::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let barrier = barrier.clone();
                let actor = fx.bob;
                tokio::spawn(async move {
                    barrier.wait().await;
                    service.add(RelationKind::Favorite, actor, target).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == AddOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);

        let rows = crate::entities::favorites::Entity::find()
            .count(&fx.store.conn)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
