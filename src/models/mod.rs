pub mod account;
pub mod catalog;
pub mod page;
pub mod recipe;
pub mod shopping_list;
