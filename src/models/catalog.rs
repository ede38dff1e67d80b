use serde::{Deserialize, Serialize};

use crate::domain::{IngredientId, TagId};
use crate::entities::{ingredients, tags};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredients::Model> for Ingredient {
    fn from(model: ingredients::Model) -> Self {
        Self {
            id: IngredientId::new(model.id),
            name: model.name,
            measurement_unit: model.measurement_unit,
        }
    }
}

/// Entry of an ingredient import file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<tags::Model> for Tag {
    fn from(model: tags::Model) -> Self {
        Self {
            id: TagId::new(model.id),
            name: model.name,
            color: model.color,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    #[must_use]
    pub fn new(name: &str, color: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        }
    }
}

/// Tags created by `seed-tags`.
#[must_use]
pub fn default_tags() -> Vec<NewTag> {
    vec![
        NewTag::new("Breakfast", "#E26C2D", "breakfast"),
        NewTag::new("Lunch", "#49B64E", "lunch"),
        NewTag::new("Dinner", "#8775D2", "dinner"),
    ]
}
