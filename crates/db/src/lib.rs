//! SQLite connection pool and schema bootstrap for Libris.

use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};

/// Idempotent DDL statement contributed by a module.
#[derive(Debug, Clone)]
pub struct SchemaStatement {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Shared handle to the process-wide connection pool.
///
/// Cloning is cheap; all clones share the same pool. The pool is opened once
/// at startup and closed with [`Database::close`] during shutdown.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `url`, creating the file if it does not exist.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let exists = Sqlite::database_exists(url)
            .await
            .with_context(|| format!("failed to check database at '{url}'"))?;
        if !exists {
            tracing::info!(target: "libris-db", %url, "creating database");
            Sqlite::create_database(url)
                .await
                .with_context(|| format!("failed to create database at '{url}'"))?;
        }

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to '{url}'"))?;

        tracing::info!(target: "libris-db", %url, max_connections, "database pool opened");
        Ok(Self { pool })
    }

    /// Private in-memory database backed by a single long-lived connection.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // Every in-memory connection is its own database, so the pool must
        // never open a second one or recycle the first.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute schema statements in the order given.
    pub async fn apply_schema(
        &self,
        statements: &[(String, SchemaStatement)],
    ) -> anyhow::Result<()> {
        for (module, statement) in statements {
            tracing::info!(
                target: "libris-db",
                module = %module,
                id = statement.id,
                "applying schema"
            );
            sqlx::query(statement.sql)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("failed to apply schema '{}' for module '{}'", statement.id, module)
                })?;
        }
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "libris-db", "database pool closed");
    }
}
