pub mod account;
pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod tag;
