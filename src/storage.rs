use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One watched video, keyed by its catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub video_id: String,
    pub title: String,
    pub image_url: String,
    pub episode: u32,
    pub source_key: String,
    /// Unix seconds.
    pub last_watched: i64,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>>;
    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert or replace the entry for `entry.video_id`.
    async fn upsert_history(&self, entry: &HistoryEntry) -> Result<()>;
    async fn find_history(&self, video_id: &str) -> Result<Option<HistoryEntry>>;
    /// Most recently watched first.
    async fn list_history(&self, limit: usize) -> Result<Vec<HistoryEntry>>;
    async fn delete_history(&self, video_id: &str) -> Result<u64>;
}
