//! Import ingredients command handler

use anyhow::Context;
use std::path::Path;

use crate::config::Config;
use crate::db::Store;
use crate::models::catalog::NewIngredient;

pub async fn cmd_import_ingredients(config: &Config, file: &Path) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let items: Vec<NewIngredient> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if items.is_empty() {
        println!("{} contains no ingredients.", file.display());
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;
    let report = store.import_ingredients(items).await?;

    println!(
        "Imported {} ingredients ({} skipped as duplicates)",
        report.inserted, report.skipped
    );

    Ok(())
}
