//! Shopping list aggregation and rendering.
//!
//! The aggregate comes straight from the store; turning it into a document is
//! delegated to a [`ShoppingListRenderer`] so other formats can be plugged in.

use std::fmt::Write;
use std::sync::Arc;

use thiserror::Error;

use crate::db::Store;
use crate::domain::AccountId;
use crate::models::shopping_list::ShoppingListItem;

#[derive(Debug, Error)]
pub enum ShoppingListError {
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ShoppingListError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ShoppingListError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A rendered shopping list ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub trait ShoppingListRenderer: Send + Sync {
    fn file_name(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn render(&self, items: &[ShoppingListItem]) -> Result<Vec<u8>, ShoppingListError>;
}

/// One `- name (unit) — total` line per item under a heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl ShoppingListRenderer for PlainTextRenderer {
    fn file_name(&self) -> &'static str {
        "shopping_list.txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, items: &[ShoppingListItem]) -> Result<Vec<u8>, ShoppingListError> {
        let mut out = String::from("Shopping list\n\n");
        for item in items {
            writeln!(
                out,
                "- {} ({}) — {}",
                item.name, item.measurement_unit, item.total_amount
            )
            .map_err(|e| ShoppingListError::Render(e.to_string()))?;
        }
        Ok(out.into_bytes())
    }
}

pub struct ShoppingListService {
    store: Store,
    renderer: Arc<dyn ShoppingListRenderer>,
}

impl ShoppingListService {
    #[must_use]
    pub fn new(store: Store, renderer: Arc<dyn ShoppingListRenderer>) -> Self {
        Self { store, renderer }
    }

    /// Summed ingredient amounts over the user's cart, ordered by name then unit.
    pub async fn aggregate(&self, user: AccountId) -> Result<Vec<ShoppingListItem>, ShoppingListError> {
        Ok(self.store.shopping_list(user).await?)
    }

    pub async fn render(&self, user: AccountId) -> Result<Document, ShoppingListError> {
        let items = self.aggregate(user).await?;
        let body = self.renderer.render(&items)?;

        Ok(Document {
            file_name: self.renderer.file_name(),
            content_type: self.renderer.content_type(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IngredientId, RelationKind, TagId};
    use crate::models::recipe::{IngredientInput, RecipeDraft};
    use crate::services::recipe_service::RecipeService;
    use crate::services::recipe_service_impl::SeaOrmRecipeService;
    use crate::services::testing::fixture;
    use serde_json::json;

    fn draft(name: &str, tag: TagId, lines: &[(IngredientId, i64)]) -> RecipeDraft {
        RecipeDraft {
            name: name.to_string(),
            text: "Bake.".to_string(),
            cooking_time: 60,
            image: String::new(),
            tags: vec![tag],
            ingredients: lines
                .iter()
                .map(|(id, amount)| IngredientInput {
                    id: *id,
                    amount: json!(amount),
                })
                .collect(),
        }
    }

    fn item(name: &str, unit: &str, total: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total_amount: total,
        }
    }

    #[test]
    fn plain_text_lists_each_item() {
        let body = PlainTextRenderer
            .render(&[item("Flour", "g", 500), item("Salt", "g", 5)])
            .unwrap();
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text, "Shopping list\n\n- Flour (g) — 500\n- Salt (g) — 5\n");
    }

    #[tokio::test]
    async fn sums_amounts_across_cart_recipes() {
        let fx = fixture().await;
        let recipes = SeaOrmRecipeService::new(fx.store.clone());

        let a = recipes
            .create_recipe(
                fx.alice,
                draft("a", fx.lunch, &[(fx.flour, 200), (fx.salt, 5)]),
            )
            .await
            .unwrap();
        let b = recipes
            .create_recipe(fx.alice, draft("b", fx.lunch, &[(fx.flour, 300)]))
            .await
            .unwrap();
        // Not in the cart, must not count.
        recipes
            .create_recipe(fx.alice, draft("c", fx.lunch, &[(fx.sugar, 50)]))
            .await
            .unwrap();

        for recipe in [&a, &b] {
            fx.store
                .add_relation(RelationKind::Cart, fx.bob, recipe.id.value())
                .await
                .unwrap();
        }

        let service = ShoppingListService::new(fx.store.clone(), Arc::new(PlainTextRenderer));
        let items = service.aggregate(fx.bob).await.unwrap();
        assert_eq!(items, vec![item("Flour", "g", 500), item("Salt", "g", 5)]);

        let document = service.render(fx.bob).await.unwrap();
        assert_eq!(document.file_name, "shopping_list.txt");
        assert!(
            String::from_utf8(document.body)
                .unwrap()
                .contains("- Flour (g) — 500")
        );
    }

    #[tokio::test]
    async fn empty_cart_gives_empty_list() {
        let fx = fixture().await;
        let service = ShoppingListService::new(fx.store.clone(), Arc::new(PlainTextRenderer));
        assert!(service.aggregate(fx.alice).await.unwrap().is_empty());
    }
}
