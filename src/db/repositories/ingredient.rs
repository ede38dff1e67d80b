use anyhow::{Context, Result};
use sea_orm::sea_query::{LikeExpr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::IngredientId;
use crate::entities::{ingredients, prelude::*};
use crate::models::catalog::{Ingredient, NewIngredient};

const IMPORT_CHUNK_SIZE: usize = 500;

/// Outcome of a bulk ingredient import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: u64,
    pub skipped: u64,
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct IngredientRepository {
    conn: DatabaseConnection,
}

impl IngredientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All ingredients ordered by name, optionally restricted to a name prefix.
    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let mut query = Ingredients::find();

        if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
            let pattern = LikeExpr::new(format!("{}%", escape_like(prefix))).escape('\\');
            query = query.filter(ingredients::Column::Name.like(pattern));
        }

        let items = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .all(&self.conn)
            .await
            .context("Failed to list ingredients")?;

        Ok(items.into_iter().map(Ingredient::from).collect())
    }

    pub async fn get(&self, id: IngredientId) -> Result<Option<Ingredient>> {
        let item = Ingredients::find_by_id(id.value()).one(&self.conn).await?;
        Ok(item.map(Ingredient::from))
    }

    pub async fn existing_ids(&self, ids: &[IngredientId]) -> Result<HashSet<IngredientId>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<i32> = Ingredients::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().map(|id| id.value())))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(found.into_iter().map(IngredientId::new).collect())
    }

    /// Insert ingredients, skipping (name, unit) pairs that already exist.
    pub async fn import_many(&self, items: Vec<NewIngredient>) -> Result<ImportReport> {
        let total = items.len() as u64;
        let txn = self.conn.begin().await?;
        let mut inserted = 0;

        for chunk in items.chunks(IMPORT_CHUNK_SIZE) {
            let models: Vec<ingredients::ActiveModel> = chunk
                .iter()
                .map(|item| ingredients::ActiveModel {
                    name: Set(item.name.trim().to_string()),
                    measurement_unit: Set(item.measurement_unit.trim().to_string()),
                    ..Default::default()
                })
                .collect();

            if models.is_empty() {
                continue;
            }

            inserted += Ingredients::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        ingredients::Column::Name,
                        ingredients::Column::MeasurementUnit,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("Failed to insert ingredient batch")?;
        }

        txn.commit().await?;

        debug!(inserted, total, "Ingredient import finished");

        Ok(ImportReport {
            inserted,
            skipped: total - inserted,
        })
    }
}
