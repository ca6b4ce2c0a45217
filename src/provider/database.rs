use std::{fs, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteJournalMode, SqliteSynchronous};
use tracing::info;

use crate::{
    configuration::Config,
    dao::{get_path, ConnectOptions, PoolOption, PoolType},
    error::Error,
    model::{Defi_Snapshot, Table},
};

const MIGRATIONS: [&str; 1] = ["defi_snapshots.sql"];

#[derive(Debug)]
pub struct DatabasePool {
    pub defi_snapshot: Table<Defi_Snapshot>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let options = ConnectOptions::from_str(config.database_url.as_str())?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let pool = PoolOption::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Private in-memory database. Pinned to one connection that never
    /// expires, otherwise the data goes away with the connection.
    pub async fn in_memory() -> Result<DatabasePool, Error> {
        let options = ConnectOptions::from_str("sqlite::memory:")?;
        let pool = PoolOption::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: PoolType) -> DatabasePool {
        DatabasePool {
            defi_snapshot: Table::new(pool.clone()),
            pool,
        }
    }

    pub async fn run_migrations(&self) -> Result<(), Error> {
        let dir = env!("CARGO_MANIFEST_DIR");

        for file in MIGRATIONS {
            let path = get_path(dir, file);
            let data = fs::read_to_string(&path)?;
            sqlx::query(data.as_str()).execute(&self.pool).await?;
            info!("Applied migration {}", file);
        }

        Ok(())
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
