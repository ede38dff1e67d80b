use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::relation::RelationTable;
use crate::domain::AccountId;
use crate::entities::{accounts, prelude::*, subscriptions};
use crate::models::account::{Account, NewAccount};
use crate::models::page::PageRequest;

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new account. Unique violations on email/username surface as
    /// `DbErr` inside the returned error.
    pub async fn create(&self, account: &NewAccount, api_key: &str) -> Result<Account> {
        let model = accounts::ActiveModel {
            email: Set(account.email.clone()),
            username: Set(account.username.clone()),
            first_name: Set(account.first_name.clone()),
            last_name: Set(account.last_name.clone()),
            api_key: Set(api_key.to_string()),
            is_admin: Set(account.is_admin),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert account")?;

        Ok(Account::from(model))
    }

    pub async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let account = Accounts::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(account.map(Account::from))
    }

    pub async fn exists(&self, id: AccountId) -> Result<bool> {
        let count = Accounts::find_by_id(id.value()).count(&self.conn).await?;
        Ok(count > 0)
    }

    /// Resolve an API key to its account
    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<Account>> {
        let account = Accounts::find()
            .filter(accounts::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query account by API key")?;

        Ok(account.map(Account::from))
    }

    /// Authors the subscriber follows, ordered by account id.
    pub async fn list_subscribed_page(
        &self,
        subscriber: AccountId,
        page: PageRequest,
    ) -> Result<(Vec<Account>, u64)> {
        let paginator = Accounts::find()
            .filter(
                accounts::Column::Id.in_subquery(subscriptions::Entity::targets_of(
                    subscriber.value(),
                )),
            )
            .order_by_asc(accounts::Column::Id)
            .paginate(&self.conn, page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok((items.into_iter().map(Account::from).collect(), total))
    }
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
