use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

use super::relation::RelationTable;
use crate::domain::AccountId;
use crate::entities::{cart_items, ingredients, prelude::*, recipe_ingredients};
use crate::models::shopping_list::ShoppingListItem;

pub struct ShoppingListRepository {
    conn: DatabaseConnection,
}

impl ShoppingListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Sum ingredient amounts over every recipe in the user's cart, one row per
    /// (name, unit), ordered by name then unit.
    pub async fn aggregate(&self, user: AccountId) -> Result<Vec<ShoppingListItem>> {
        let items = RecipeIngredients::find()
            .select_only()
            .column_as(ingredients::Column::Name, "name")
            .column_as(ingredients::Column::MeasurementUnit, "measurement_unit")
            .column_as(recipe_ingredients::Column::Amount.sum(), "total_amount")
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Ingredient.def(),
            )
            .filter(
                recipe_ingredients::Column::RecipeId
                    .in_subquery(cart_items::Entity::targets_of(user.value())),
            )
            .group_by(ingredients::Column::Name)
            .group_by(ingredients::Column::MeasurementUnit)
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .into_model::<ShoppingListItem>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate shopping list")?;

        Ok(items)
    }
}
