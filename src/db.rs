use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;

use crate::dao;
use crate::storage::{HistoryEntry, HistoryStore, Storage};

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to `database_url`, or to a SQLite file in the user's data
    /// directory when none is given.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }

    pub async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64> {
        let result = if let Some(p) = prefix {
            let like = format!("{}%", p);
            sqlx::query("DELETE FROM search_cache WHERE key LIKE ?")
                .bind(like)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM search_cache")
                .execute(&self.pool)
                .await?
        };
        Ok(result.rows_affected())
    }

    pub async fn vacuum(&self) -> Result<()> {
        // Best-effort: works on SQLite
        let _ = sqlx::query("VACUUM").execute(&self.pool).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for Database {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>> {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT payload FROM search_cache WHERE key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO search_cache(key, payload, expires_at) VALUES (?, ?, ?)\n             ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, expires_at=excluded.expires_at",
        )
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HistoryStore for Database {
    async fn upsert_history(&self, entry: &HistoryEntry) -> Result<()> {
        dao::upsert_history(&self.pool, entry).await
    }

    async fn find_history(&self, video_id: &str) -> Result<Option<HistoryEntry>> {
        dao::find_history(&self.pool, video_id).await
    }

    async fn list_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        dao::list_history(&self.pool, limit).await
    }

    async fn delete_history(&self, video_id: &str) -> Result<u64> {
        dao::delete_history(&self.pool, video_id).await
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "vodhub", "vodhub")
        .context("unable to determine data directory for default sqlite path")?;
    let path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    Ok(sqlite_url_for(&path.join("vodhub.db")))
}

/// `sqlite://` URL for a file path, creating the file on first open.
pub fn sqlite_url_for(path: &std::path::Path) -> String {
    // Encode spaces in the path for a valid sqlite URL
    let path_str = path.to_string_lossy().replace(' ', "%20");
    format!("sqlite://{path_str}?mode=rwc")
}
