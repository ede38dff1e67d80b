use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, IngredientId, RecipeId, TagId};
use crate::entities::recipes;
use crate::models::account::AuthorProfile;
use crate::models::catalog::Tag;

/// One requested ingredient line. `amount` is kept raw until validation because
/// clients send it either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub id: IngredientId,
    pub amount: serde_json::Value,
}

/// Unvalidated input for a new recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

/// Unvalidated partial update. `None` leaves the stored value untouched;
/// `Some` for `tags` or `ingredients` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientInput>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient_id: IngredientId,
    pub amount: i32,
}

/// A validated recipe ready to be written.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: AccountId,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub tag_ids: Vec<TagId>,
    pub lines: Vec<IngredientLine>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
    pub lines: Option<Vec<IngredientLine>>,
}

/// Ingredient line joined with its ingredient, as fetched for a page of recipes.
#[derive(Debug, Clone, FromQueryResult)]
pub struct RecipeIngredientRow {
    pub recipe_id: i32,
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientRow> for RecipeIngredient {
    fn from(row: RecipeIngredientRow) -> Self {
        Self {
            id: IngredientId::new(row.id),
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

/// Full read model of a recipe with viewer-relative flags.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub pub_date: String,
    pub author: AuthorProfile,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short form used in subscription listings and toggle responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipes::Model> for RecipeSummary {
    fn from(model: recipes::Model) -> Self {
        Self {
            id: RecipeId::new(model.id),
            name: model.name,
            image: model.image,
            cooking_time: model.cooking_time,
        }
    }
}

/// Catalog filters, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<AccountId>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    /// Tag slugs; a recipe matches if it carries any of them.
    pub tags: Vec<String>,
}
