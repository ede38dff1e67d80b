mod create_account;
mod import_ingredients;
mod init;
mod seed_tags;

pub use create_account::{AccountArgs, cmd_create_account};
pub use import_ingredients::cmd_import_ingredients;
pub use init::cmd_init;
pub use seed_tags::cmd_seed_tags;
