use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{config::Config, database_validator::DatabaseValidator};

/// Single-process deployment backed by a local SQLite file.
#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
}

impl LocalDeployment {
    /// Assemble from an already opened database, skipping environment lookup.
    pub fn from_parts(config: Config, db: DBService) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = Config::from_env()?;
        let db = DBService::new(config.database_url.as_deref()).await?;

        let validation = DatabaseValidator::new(db.pool.clone()).validate().await?;
        if !validation.is_ok() {
            return Err(DeploymentError::SchemaIncomplete(validation.summary()));
        }

        tracing::debug!(
            host = %config.host,
            port = config.port,
            display_locale = %config.display_locale,
            "Local deployment initialized"
        );

        Ok(Self::from_parts(config, db))
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }
}
