use serde::Serialize;

use crate::domain::AccountId;
use crate::entities::accounts;
use crate::models::recipe::RecipeSummary;

/// Account data handed out by the store (never includes the API key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId::new(model.id),
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            is_admin: model.is_admin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// An account as seen by a viewer: the profile plus whether the viewer follows it.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorProfile {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl AuthorProfile {
    #[must_use]
    pub fn new(account: Account, is_subscribed: bool) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            is_subscribed,
        }
    }
}

/// Entry of the viewer's subscription list.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribedAuthor {
    #[serde(flatten)]
    pub profile: AuthorProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: u64,
}
