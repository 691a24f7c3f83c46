use async_trait::async_trait;
use db::DBService;
use services::services::{
    config::{Config, ConfigError},
    database_validator::DatabaseValidationError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error("database schema incomplete: {0}")]
    SchemaIncomplete(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything a request handler needs from the running process.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;
}
