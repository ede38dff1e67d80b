//! Domain service for accounts: registration, API-key resolution, profiles
//! and the subscription listing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AccountId, Viewer};
use crate::models::account::{Account, AuthorProfile, NewAccount, SubscribedAuthor};
use crate::models::page::{Page, PageRequest};

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_PERSON_NAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A freshly registered account together with its API key. The key is only
/// ever handed out here.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAccount {
    #[serde(flatten)]
    pub account: Account,
    pub api_key: String,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an account with a fresh API key.
    ///
    /// # Errors
    ///
    /// - Returns [`AccountError::Validation`] for malformed fields
    /// - Returns [`AccountError::Conflict`] if the email or username is taken
    async fn register(
        &self,
        registration: Registration,
        is_admin: bool,
    ) -> Result<RegisteredAccount, AccountError>;

    /// Resolves an API key. `None` means the key is unknown.
    async fn authenticate(&self, api_key: &str) -> Result<Option<AccountId>, AccountError>;

    async fn get_account(&self, id: AccountId) -> Result<Account, AccountError>;

    /// Public profile of `id` with `is_subscribed` relative to the viewer.
    async fn get_profile(&self, id: AccountId, viewer: Viewer)
    -> Result<AuthorProfile, AccountError>;

    /// One author the viewer follows, with recipe previews.
    async fn get_subscribed_author(
        &self,
        viewer: AccountId,
        author: AccountId,
        recipes_limit: Option<u64>,
    ) -> Result<SubscribedAuthor, AccountError>;

    /// Authors the viewer follows, each with `recipes_count` and up to
    /// `recipes_limit` of their newest recipes.
    async fn list_subscriptions(
        &self,
        viewer: AccountId,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<SubscribedAuthor>, AccountError>;
}

/// Trims and checks the registration fields.
pub fn validate_registration(
    registration: Registration,
    is_admin: bool,
) -> Result<NewAccount, AccountError> {
    let email = registration.email.trim().to_string();
    let username = registration.username.trim().to_string();
    let first_name = registration.first_name.trim().to_string();
    let last_name = registration.last_name.trim().to_string();

    let valid_email = email.len() <= MAX_EMAIL_LENGTH
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AccountError::Validation("invalid email".to_string()));
    }

    let valid_username = !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'));
    if !valid_username {
        return Err(AccountError::Validation("invalid username".to_string()));
    }

    for name in [&first_name, &last_name] {
        if name.is_empty() || name.chars().count() > MAX_PERSON_NAME_LENGTH {
            return Err(AccountError::Validation("invalid name".to_string()));
        }
    }

    Ok(NewAccount {
        email,
        username,
        first_name,
        last_name,
        is_admin,
    })
}
