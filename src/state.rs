use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    auth::{
        jwt::TokenService,
        repo::{PgUserDirectory, UserDirectory},
    },
    config::AppConfig,
    memory::MemoryStore,
    orders::repo::{OrderStore, PgOrderStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserDirectory>,
    pub orders: Arc<dyn OrderStore>,
    pub db: Option<PgPool>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        if config.uses_memory_store() {
            tracing::warn!("using in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            return Ok(Self::from_parts(config, store.clone(), store, None));
        }

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserDirectory::new(db.clone())),
            Arc::new(PgOrderStore::new(db.clone())),
            Some(db),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserDirectory>,
        orders: Arc<dyn OrderStore>,
        db: Option<PgPool>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        Self {
            config,
            tokens,
            users,
            orders,
            db,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{Environment, JwtConfig};

        let config = Arc::new(AppConfig {
            environment: Environment::Development,
            database_url: "memory://".into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: 60,
            },
            admin: None,
        });
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store, None)
    }
}
