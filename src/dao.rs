use anyhow::Result;
use sqlx::AnyPool;

use crate::storage::HistoryEntry;

type HistoryRow = (String, String, String, i64, String, i64);

const HISTORY_COLUMNS: &str = "video_id, title, image_url, episode, source_key, last_watched";

fn entry_from_row(row: HistoryRow) -> HistoryEntry {
    let (video_id, title, image_url, episode, source_key, last_watched) = row;
    HistoryEntry {
        video_id,
        title,
        image_url,
        episode: u32::try_from(episode).unwrap_or(1).max(1),
        source_key,
        last_watched,
    }
}

pub async fn upsert_history(pool: &AnyPool, e: &HistoryEntry) -> Result<()> {
    sqlx::query(
        "INSERT INTO watch_history(video_id, title, image_url, episode, source_key, last_watched)\n         VALUES(?, ?, ?, ?, ?, ?)\n         ON CONFLICT(video_id) DO UPDATE SET\n           title=excluded.title, image_url=excluded.image_url, episode=excluded.episode,\n           source_key=excluded.source_key, last_watched=excluded.last_watched",
    )
    .bind(&e.video_id)
    .bind(&e.title)
    .bind(&e.image_url)
    .bind(i64::from(e.episode))
    .bind(&e.source_key)
    .bind(e.last_watched)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_history(pool: &AnyPool, video_id: &str) -> Result<Option<HistoryEntry>> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM watch_history WHERE video_id = ? LIMIT 1");
    let row = sqlx::query_as::<_, HistoryRow>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(entry_from_row))
}

pub async fn list_history(pool: &AnyPool, limit: usize) -> Result<Vec<HistoryEntry>> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM watch_history ORDER BY last_watched DESC, video_id LIMIT ?");
    let rows = sqlx::query_as::<_, HistoryRow>(&sql)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(entry_from_row).collect())
}

pub async fn delete_history(pool: &AnyPool, video_id: &str) -> Result<u64> {
    let res = sqlx::query("DELETE FROM watch_history WHERE video_id = ?")
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn purge_expired_cache(pool: &AnyPool, now: i64) -> Result<u64> {
    let res = sqlx::query("DELETE FROM search_cache WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
