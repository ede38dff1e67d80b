//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use sea_orm::SqlErr;
use tracing::info;

use crate::db::repositories::account::generate_api_key;
use crate::db::{Store, sql_error};
use crate::domain::{AccountId, RelationKind, Viewer};
use crate::models::account::{Account, AuthorProfile, SubscribedAuthor};
use crate::models::page::{Page, PageRequest};
use crate::services::account_service::{
    AccountError, AccountService, RegisteredAccount, Registration, validate_registration,
};

pub struct SeaOrmAccountService {
    store: Store,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn is_subscribed(&self, viewer: Viewer, author: AccountId) -> Result<bool, AccountError> {
        match viewer.account_id() {
            Some(viewer) if viewer != author => Ok(self
                .store
                .relation_exists(RelationKind::Subscription, viewer, author.value())
                .await?),
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(
        &self,
        registration: Registration,
        is_admin: bool,
    ) -> Result<RegisteredAccount, AccountError> {
        let account = validate_registration(registration, is_admin)?;
        let api_key = generate_api_key();

        let account = match self.store.create_account(&account, &api_key).await {
            Ok(account) => account,
            Err(err) => {
                return Err(match sql_error(&err) {
                    Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::Conflict(
                        "an account with this email or username already exists".to_string(),
                    ),
                    _ => err.into(),
                });
            }
        };

        info!(account_id = %account.id, username = %account.username, "Account registered");
        Ok(RegisteredAccount { account, api_key })
    }

    async fn authenticate(&self, api_key: &str) -> Result<Option<AccountId>, AccountError> {
        Ok(self
            .store
            .get_account_by_api_key(api_key)
            .await?
            .map(|account| account.id))
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    async fn get_profile(
        &self,
        id: AccountId,
        viewer: Viewer,
    ) -> Result<AuthorProfile, AccountError> {
        let account = self.get_account(id).await?;
        let is_subscribed = self.is_subscribed(viewer, id).await?;
        Ok(AuthorProfile::new(account, is_subscribed))
    }

    async fn get_subscribed_author(
        &self,
        viewer: AccountId,
        author: AccountId,
        recipes_limit: Option<u64>,
    ) -> Result<SubscribedAuthor, AccountError> {
        let profile = self.get_profile(author, Viewer::Account(viewer)).await?;
        let (recipes, recipes_count) = self
            .store
            .recipe_summaries_by_authors(&[author], recipes_limit)
            .await?
            .remove(&author)
            .unwrap_or_default();

        Ok(SubscribedAuthor {
            profile,
            recipes,
            recipes_count,
        })
    }

    async fn list_subscriptions(
        &self,
        viewer: AccountId,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<SubscribedAuthor>, AccountError> {
        let (authors, count) = self.store.list_subscribed_authors(viewer, page).await?;
        let ids: Vec<AccountId> = authors.iter().map(|a| a.id).collect();
        let mut recipes = self
            .store
            .recipe_summaries_by_authors(&ids, recipes_limit)
            .await?;

        let results = authors
            .into_iter()
            .map(|account| {
                let (recipes, recipes_count) = recipes.remove(&account.id).unwrap_or_default();
                SubscribedAuthor {
                    profile: AuthorProfile::new(account, true),
                    recipes,
                    recipes_count,
                }
            })
            .collect();

        Ok(Page::new(results, count, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::{IngredientInput, RecipeDraft};
    use crate::services::recipe_service::RecipeService;
    use crate::services::recipe_service_impl::SeaOrmRecipeService;
    use crate::services::testing::fixture;
    use serde_json::json;

    fn registration(email: &str, username: &str) -> Registration {
        Registration {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let fx = fixture().await;
        let service = SeaOrmAccountService::new(fx.store.clone());

        let registered = service
            .register(registration("grace@example.com", "grace"), false)
            .await
            .unwrap();
        assert_eq!(registered.api_key.len(), 64);

        let id = service.authenticate(&registered.api_key).await.unwrap();
        assert_eq!(id, Some(registered.account.id));
        assert_eq!(service.authenticate("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_email_or_username_conflicts() {
        let fx = fixture().await;
        let service = SeaOrmAccountService::new(fx.store.clone());

        let err = service
            .register(registration("alice@example.com", "someone"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Conflict(_)), "{err:?}");

        let err = service
            .register(registration("new@example.com", "alice"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn subscriptions_list_counts_and_limits_recipes() {
        let fx = fixture().await;
        let recipes = SeaOrmRecipeService::new(fx.store.clone());
        for (author, n) in [(fx.alice, 0), (fx.alice, 1), (fx.admin, 0), (fx.alice, 2)] {
            recipes
                .create_recipe(
                    author,
                    RecipeDraft {
                        name: format!("dish {n}"),
                        text: "Cook.".to_string(),
                        cooking_time: 10,
                        image: String::new(),
                        tags: vec![fx.lunch],
                        ingredients: vec![IngredientInput {
                            id: fx.salt,
                            amount: json!(1),
                        }],
                    },
                )
                .await
                .unwrap();
        }
        for author in [fx.alice, fx.admin] {
            fx.store
                .add_relation(RelationKind::Subscription, fx.bob, author.value())
                .await
                .unwrap();
        }

        let service = SeaOrmAccountService::new(fx.store.clone());
        let page = service
            .list_subscriptions(fx.bob, PageRequest::new(1, 10), Some(2))
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        let author = &page.results[0];
        assert_eq!(author.profile.id, fx.alice);
        assert!(author.profile.is_subscribed);
        assert_eq!(author.recipes_count, 3);
        let names: Vec<_> = author.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["dish 2", "dish 1"]);

        let other = &page.results[1];
        assert_eq!(other.profile.id, fx.admin);
        assert_eq!(other.recipes_count, 1);
        assert_eq!(other.recipes.len(), 1);

        let none = service
            .list_subscriptions(fx.bob, PageRequest::new(1, 10), Some(0))
            .await
            .unwrap();
        assert!(none.results.iter().all(|a| a.recipes.is_empty()));

        let empty = service
            .list_subscriptions(fx.alice, PageRequest::new(1, 10), None)
            .await
            .unwrap();
        assert_eq!(empty.count, 0);
    }

    #[tokio::test]
    async fn profile_reports_subscription_for_viewer() {
        let fx = fixture().await;
        fx.store
            .add_relation(RelationKind::Subscription, fx.bob, fx.alice.value())
            .await
            .unwrap();
        let service = SeaOrmAccountService::new(fx.store.clone());

        let seen_by_bob = service
            .get_profile(fx.alice, Viewer::Account(fx.bob))
            .await
            .unwrap();
        assert!(seen_by_bob.is_subscribed);

        let anonymous = service.get_profile(fx.alice, Viewer::Anonymous).await.unwrap();
        assert!(!anonymous.is_subscribed);

        let err = service
            .get_profile(AccountId::new(999), Viewer::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }
}
