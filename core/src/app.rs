//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::clients::{GeminiClient, PexelsClient};
use crate::config::ProviderConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{
    FoodRecognizer, ImageLookup, InventoryService, RecipeService, SettingsService,
};
use crate::storage::InventoryStore;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Database file inside the app data directory
pub const DATABASE_FILE: &str = "freshkeep.db";

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub inventory: InventoryService,
    pub settings: SettingsService,
    pub recipes: RecipeService,
    pub recognizer: Arc<dyn FoodRecognizer>,
}

impl AppState {
    /// Wire every service over an open pool
    pub fn new(app_data_dir: PathBuf, pool: SqlitePool, providers: &ProviderConfig) -> Result<Self> {
        let repo = Repository::new(pool);

        let gemini = Arc::new(GeminiClient::new(providers.ai.clone())?);
        let images: Option<Arc<dyn ImageLookup>> = match &providers.image_search {
            Some(cfg) => Some(Arc::new(PexelsClient::new(cfg.clone())?)),
            None => None,
        };

        Ok(Self {
            app_data_dir,
            inventory: InventoryService::new(InventoryStore::new(repo.clone())),
            settings: SettingsService::new(repo),
            recipes: RecipeService::new(gemini.clone(), images)
                .with_count(providers.ai.suggestion_count),
            recognizer: gemini,
        })
    }

    /// Application setup - called once on startup
    pub async fn initialize(app_data_dir: &Path, providers: ProviderConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        std::fs::create_dir_all(app_data_dir)?;

        let pool = create_pool(&app_data_dir.join(DATABASE_FILE)).await?;
        let state = Self::new(app_data_dir.to_path_buf(), pool, &providers)?;

        if providers.image_search.is_none() {
            tracing::info!("Image search not configured; meal pictures come from the AI reply only");
        }

        tracing::info!("Application initialized successfully");

        Ok(state)
    }
}
