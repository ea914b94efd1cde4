use serde::{Deserialize, Serialize};

use crate::api::VideoRecord;
use crate::storage::HistoryEntry;

/// Search-result card fields derived from a catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCard {
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Score with one decimal, when the catalog has one.
    pub rating: Option<String>,
    /// Only present when the record carries a play list.
    pub episode_count: Option<usize>,
}

pub fn history_entry_from(video: &VideoRecord, episode: u32, source_key: &str, now: i64) -> HistoryEntry {
    HistoryEntry {
        video_id: video.id.clone(),
        title: video.name.clone(),
        image_url: video.pic.clone(),
        episode,
        source_key: source_key.to_string(),
        last_watched: now,
    }
}

pub fn card_from(video: &VideoRecord) -> VideoCard {
    VideoCard {
        id: video.id.clone(),
        title: video.name.clone(),
        image_url: video.pic.clone(),
        rating: video.score.map(|s| format!("{:.1}", s)),
        episode_count: Some(video.episode_count()).filter(|_| !video.play_url.is_empty()),
    }
}
