use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashSet;

use crate::domain::TagId;
use crate::entities::{prelude::*, tags};
use crate::models::catalog::{NewTag, Tag};

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Tag>> {
        let items = Tags::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list tags")?;

        Ok(items.into_iter().map(Tag::from).collect())
    }

    pub async fn get(&self, id: TagId) -> Result<Option<Tag>> {
        let tag = Tags::find_by_id(id.value()).one(&self.conn).await?;
        Ok(tag.map(Tag::from))
    }

    pub async fn existing_ids(&self, ids: &[TagId]) -> Result<HashSet<TagId>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<i32> = Tags::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().map(|id| id.value())))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(found.into_iter().map(TagId::new).collect())
    }

    /// Insert tags whose slug is not taken yet; returns how many were added.
    pub async fn seed(&self, items: Vec<NewTag>) -> Result<u64> {
        if items.is_empty() {
            return Ok(0);
        }

        let models: Vec<tags::ActiveModel> = items
            .into_iter()
            .map(|tag| tags::ActiveModel {
                name: Set(tag.name),
                color: Set(tag.color),
                slug: Set(tag.slug),
                ..Default::default()
            })
            .collect();

        let inserted = Tags::insert_many(models)
            .on_conflict(
                OnConflict::column(tags::Column::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to seed tags")?;

        Ok(inserted)
    }
}
