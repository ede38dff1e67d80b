//! Seed tags command handler

use crate::config::Config;
use crate::db::Store;
use crate::models::catalog::default_tags;

pub async fn cmd_seed_tags(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let defaults = default_tags();
    let total = defaults.len();
    let inserted = store.seed_tags(defaults).await?;

    println!("Tags: {} inserted, {} already present", inserted, total as u64 - inserted);

    for tag in store.list_tags().await? {
        println!("  [{}] {} ({}, {})", tag.id, tag.name, tag.slug, tag.color);
    }

    Ok(())
}
