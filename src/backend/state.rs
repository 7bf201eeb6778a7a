//! État partagé entre tous les handlers.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::cache::PageCache;
use crate::config::Config;
use crate::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Database>>,
    pub hbs: Arc<Handlebars<'static>>,
    pub cache: Arc<PageCache>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Ouvre la base configurée et charge les templates
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.db_path)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.register_templates_directory(".hbs", &config.templates_dir)
            .with_context(|| {
                format!(
                    "Could not register template directory {}",
                    config.templates_dir.display()
                )
            })?;
        info!("Registered {} templates", hbs.get_templates().len());

        std::fs::create_dir_all(&config.media_dir).with_context(|| {
            format!("Could not create media directory {}", config.media_dir.display())
        })?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            hbs: Arc::new(hbs),
            cache: Arc::new(PageCache::new(config.index_cache_ttl)),
            config: Arc::new(config),
        })
    }
}
