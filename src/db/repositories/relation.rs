use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict, Query, SelectStatement};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect, Set,
};
use std::collections::HashSet;

use crate::domain::{AccountId, AddOutcome, RelationKind};
use crate::entities::{cart_items, favorites, subscriptions};

/// A join table holding one row per (actor, target) pair, keyed on both columns.
///
/// Favorites, cart items and subscriptions all share this shape, so inserts,
/// deletes and membership lookups are written once against this trait.
pub trait RelationTable: EntityTrait {
    fn actor_column() -> Self::Column;
    fn target_column() -> Self::Column;
    fn pair(actor: i32, target: i32) -> Self::ActiveModel;

    /// `SELECT target FROM table WHERE actor = ?`, for use in `IN (...)` filters.
    fn targets_of(actor: i32) -> SelectStatement {
        Query::select()
            .column(Self::target_column())
            .from(Self::default())
            .and_where(Expr::col(Self::actor_column()).eq(actor))
            .to_owned()
    }
}

impl RelationTable for favorites::Entity {
    fn actor_column() -> Self::Column {
        favorites::Column::UserId
    }

    fn target_column() -> Self::Column {
        favorites::Column::RecipeId
    }

    fn pair(actor: i32, target: i32) -> Self::ActiveModel {
        favorites::ActiveModel {
            user_id: Set(actor),
            recipe_id: Set(target),
        }
    }
}

impl RelationTable for cart_items::Entity {
    fn actor_column() -> Self::Column {
        cart_items::Column::UserId
    }

    fn target_column() -> Self::Column {
        cart_items::Column::RecipeId
    }

    fn pair(actor: i32, target: i32) -> Self::ActiveModel {
        cart_items::ActiveModel {
            user_id: Set(actor),
            recipe_id: Set(target),
        }
    }
}

impl RelationTable for subscriptions::Entity {
    fn actor_column() -> Self::Column {
        subscriptions::Column::SubscriberId
    }

    fn target_column() -> Self::Column {
        subscriptions::Column::AuthorId
    }

    fn pair(actor: i32, target: i32) -> Self::ActiveModel {
        subscriptions::ActiveModel {
            subscriber_id: Set(actor),
            author_id: Set(target),
        }
    }
}

/// Inserts the pair unless it already exists. The primary key decides, so two
/// concurrent inserts produce exactly one row and one `Created`.
pub async fn insert_pair<T, C>(conn: &C, actor: i32, target: i32) -> Result<AddOutcome>
where
    T: RelationTable,
    T::Model: IntoActiveModel<T::ActiveModel>,
    C: ConnectionTrait,
{
    let inserted = T::insert(T::pair(actor, target))
        .on_conflict(
            OnConflict::columns([T::actor_column(), T::target_column()])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .with_context(|| format!("Failed to insert relation row ({actor}, {target})"))?;

    Ok(if inserted == 0 {
        AddOutcome::AlreadyExists
    } else {
        AddOutcome::Created
    })
}

/// Deletes the pair; returns whether a row was removed.
pub async fn delete_pair<T, C>(conn: &C, actor: i32, target: i32) -> Result<bool>
where
    T: RelationTable,
    C: ConnectionTrait,
{
    let result = T::delete_many()
        .filter(T::actor_column().eq(actor))
        .filter(T::target_column().eq(target))
        .exec(conn)
        .await
        .with_context(|| format!("Failed to delete relation row ({actor}, {target})"))?;

    Ok(result.rows_affected > 0)
}

/// The subset of `targets` the actor is related to.
pub async fn targets_among<T, C>(conn: &C, actor: i32, targets: &[i32]) -> Result<HashSet<i32>>
where
    T: RelationTable,
    C: ConnectionTrait,
{
    if targets.is_empty() {
        return Ok(HashSet::new());
    }

    let found: Vec<i32> = T::find()
        .select_only()
        .column(T::target_column())
        .filter(T::actor_column().eq(actor))
        .filter(T::target_column().is_in(targets.to_vec()))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(found.into_iter().collect())
}

pub struct RelationRepository {
    conn: DatabaseConnection,
}

impl RelationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        kind: RelationKind,
        actor: AccountId,
        target: i32,
    ) -> Result<AddOutcome> {
        let actor = actor.value();
        match kind {
            RelationKind::Favorite => {
                insert_pair::<favorites::Entity, _>(&self.conn, actor, target).await
            }
            RelationKind::Cart => {
                insert_pair::<cart_items::Entity, _>(&self.conn, actor, target).await
            }
            RelationKind::Subscription => {
                insert_pair::<subscriptions::Entity, _>(&self.conn, actor, target).await
            }
        }
    }

    pub async fn delete(&self, kind: RelationKind, actor: AccountId, target: i32) -> Result<bool> {
        let actor = actor.value();
        match kind {
            RelationKind::Favorite => {
                delete_pair::<favorites::Entity, _>(&self.conn, actor, target).await
            }
            RelationKind::Cart => {
                delete_pair::<cart_items::Entity, _>(&self.conn, actor, target).await
            }
            RelationKind::Subscription => {
                delete_pair::<subscriptions::Entity, _>(&self.conn, actor, target).await
            }
        }
    }

    pub async fn viewer_targets(
        &self,
        kind: RelationKind,
        actor: AccountId,
        targets: &[i32],
    ) -> Result<HashSet<i32>> {
        let actor = actor.value();
        match kind {
            RelationKind::Favorite => {
                targets_among::<favorites::Entity, _>(&self.conn, actor, targets).await
            }
            RelationKind::Cart => {
                targets_among::<cart_items::Entity, _>(&self.conn, actor, targets).await
            }
            RelationKind::Subscription => {
                targets_among::<subscriptions::Entity, _>(&self.conn, actor, targets).await
            }
        }
    }
}
