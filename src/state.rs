use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, PlainTextRenderer, RecipeService, RelationService, SeaOrmAccountService,
    SeaOrmRecipeService, SeaOrmRelationService, ShoppingListService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub recipe_service: Arc<dyn RecipeService>,

    pub relation_service: Arc<dyn RelationService>,

    pub account_service: Arc<dyn AccountService>,

    pub shopping_list: Arc<ShoppingListService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already opened store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let recipe_service = Arc::new(SeaOrmRecipeService::new(store.clone()))
            as Arc<dyn RecipeService>;

        let relation_service = Arc::new(SeaOrmRelationService::new(store.clone()))
            as Arc<dyn RelationService>;

        let account_service = Arc::new(SeaOrmAccountService::new(store.clone()))
            as Arc<dyn AccountService>;

        let shopping_list = Arc::new(ShoppingListService::new(
            store.clone(),
            Arc::new(PlainTextRenderer),
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            recipe_service,
            relation_service,
            account_service,
            shopping_list,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
