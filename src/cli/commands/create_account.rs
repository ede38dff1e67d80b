//! Create account command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, Registration, SeaOrmAccountService};

pub struct AccountArgs {
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub admin: bool,
}

pub async fn cmd_create_account(config: &Config, args: AccountArgs) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let service = SeaOrmAccountService::new(store);

    let registration = Registration {
        first_name: args.first_name.unwrap_or_else(|| args.username.clone()),
        last_name: args.last_name.unwrap_or_else(|| args.username.clone()),
        email: args.email,
        username: args.username,
    };

    let created = service.register(registration, args.admin).await?;

    println!("Created account #{}", created.account.id);
    println!("  Username: {}", created.account.username);
    println!("  Email:    {}", created.account.email);
    if created.account.is_admin {
        println!("  Role:     admin");
    }
    println!();
    println!("API key: {}", created.api_key);
    println!("Send it as 'X-Api-Key: <key>' or 'Authorization: Token <key>'.");

    Ok(())
}
