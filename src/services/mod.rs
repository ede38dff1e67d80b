pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, RegisteredAccount, Registration};
pub use account_service_impl::SeaOrmAccountService;

pub mod recipe_service;
pub mod recipe_service_impl;
pub use recipe_service::{RecipeError, RecipeService};
pub use recipe_service_impl::SeaOrmRecipeService;

pub mod relation_service;
pub mod relation_service_impl;
pub use relation_service::{RelationError, RelationService};
pub use relation_service_impl::SeaOrmRelationService;

pub mod shopping_list;
pub use shopping_list::{
    Document, PlainTextRenderer, ShoppingListError, ShoppingListRenderer, ShoppingListService,
};

#[cfg(test)]
pub(crate) mod testing;
