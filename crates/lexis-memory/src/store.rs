//! SQLite-backed preference store.

use lexis_core::{
    config::MemoryConfig, error::LexisError, language::validate_language, shellexpand,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

/// Fixed storage key of the persisted active language.
pub const ACTIVE_LANGUAGE_KEY: &str = "active_language";

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_preferences",
    "CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );",
)];

/// Persistent key/value preferences backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, LexisError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LexisError::Memory(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| LexisError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(opts)
            .await
            .map_err(|e| LexisError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Preference store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), LexisError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| LexisError::Memory(format!("failed to create migrations table: {e}")))?;

        for (name, sql) in MIGRATIONS {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        LexisError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| LexisError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    LexisError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }

    /// Store a preference (upsert by key).
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<(), LexisError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| LexisError::Memory(format!("upsert preference failed: {e}")))?;

        Ok(())
    }

    /// Get a single preference by key.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>, LexisError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LexisError::Memory(format!("query failed: {e}")))?;

        Ok(row.map(|(v,)| v))
    }

    /// Delete a preference. Returns `true` if a row was deleted.
    pub async fn delete_preference(&self, key: &str) -> Result<bool, LexisError> {
        let result = sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| LexisError::Memory(format!("delete failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Persisted active language, if one was ever set.
    pub async fn active_language(&self) -> Result<Option<String>, LexisError> {
        let stored = self.get_preference(ACTIVE_LANGUAGE_KEY).await?;
        Ok(stored.filter(|v| !v.trim().is_empty()))
    }

    /// Persist the active language selection.
    pub async fn set_active_language(&self, language: &str) -> Result<(), LexisError> {
        let language = validate_language(language)?;
        self.set_preference(ACTIVE_LANGUAGE_KEY, language).await?;
        debug!("preferences: active language persisted as '{language}'");
        Ok(())
    }
}
