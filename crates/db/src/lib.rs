use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use utils::assets::asset_dir;

pub mod models;

#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (creating if needed) the database at `database_url`, or `db.sqlite` in the
    /// asset directory when no URL is configured, and apply pending migrations.
    pub async fn new(database_url: Option<&str>) -> Result<DBService, Error> {
        let database_url = match database_url {
            Some(url) => url.to_string(),
            None => {
                let path = asset_dir().map_err(Error::Io)?.join("db.sqlite");
                format!("sqlite://{}", path.to_string_lossy())
            }
        };

        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(database_url = %database_url, "database ready");

        Ok(DBService { pool })
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Pinned to a single connection that never idles out, since every new
    /// connection to `sqlite::memory:` would see an empty database.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(DBService { pool })
    }
}
