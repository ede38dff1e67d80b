pub use super::accounts::Entity as Accounts;
pub use super::cart_items::Entity as CartItems;
pub use super::favorites::Entity as Favorites;
pub use super::ingredients::Entity as Ingredients;
pub use super::recipe_ingredients::Entity as RecipeIngredients;
pub use super::recipe_tags::Entity as RecipeTags;
pub use super::recipes::Entity as Recipes;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::tags::Entity as Tags;
