// src/state.rs
use crate::auth::magic::MagicLinkConfig;
use crate::cache::DirectoryCache;
use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::mailer::Mailer;

/// Everything a request handler needs, built once in `main` and shared by reference.
pub struct AppState {
    pub db: Database,
    pub cache: DirectoryCache,
    pub mailer: Mailer,
    pub magic: MagicLinkConfig,
    pub public_url: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            db: Database::new(cfg.db_path.clone()),
            cache: DirectoryCache::new(cfg.cache_ttl),
            mailer: Mailer::from_config(&cfg.mail),
            magic: MagicLinkConfig {
                public_url: cfg.public_url.clone(),
                ..MagicLinkConfig::default()
            },
            public_url: cfg.public_url.clone(),
        }
    }
}
