//! Play-list parsing: `label$url#label$url#...` into numbered episodes.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Separates episodes in a play-list string.
pub const ENTRY_DELIMITER: char = '#';
/// Separates the label from the stream URL inside one entry.
pub const LABEL_DELIMITER: char = '$';

/// One playable episode, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    pub label: String,
    pub url: String,
}

/// Fallback display label for entries that carry none.
pub fn synthesized_label(number: u32) -> String {
    format!("Episode {:02}", number)
}

fn entries(play_list: &str) -> impl Iterator<Item = &str> {
    // An empty string holds no episodes, not one empty episode.
    let source = if play_list.is_empty() { None } else { Some(play_list) };
    source.into_iter().flat_map(|s| s.split(ENTRY_DELIMITER))
}

fn parse_entry(number: u32, text: &str) -> Episode {
    let parts: Vec<&str> = text.split(LABEL_DELIMITER).collect();
    match parts.as_slice() {
        [url] => Episode { number, label: synthesized_label(number), url: (*url).to_string() },
        [label, url, rest @ ..] => {
            if !rest.is_empty() {
                warn!(episode = number, entry = text, "play-list entry has extra '$' delimiters; url truncated");
            }
            let label = if label.is_empty() { synthesized_label(number) } else { (*label).to_string() };
            Episode { number, label, url: (*url).to_string() }
        }
        [] => Episode { number, label: synthesized_label(number), url: String::new() },
    }
}

/// Number of episodes encoded in `play_list`.
pub fn episode_count(play_list: &str) -> usize {
    entries(play_list).count()
}

/// Resolve the 1-based `episode` to its label and stream URL.
///
/// Returns `None` when the episode is outside `1..=episode_count`; callers
/// treat that as "nothing to play".
pub fn resolve(play_list: &str, episode: u32) -> Option<Episode> {
    if episode == 0 {
        return None;
    }
    let text = entries(play_list).nth(episode as usize - 1)?;
    Some(parse_entry(episode, text))
}

/// All episodes with their display labels, in play-list order.
pub fn episodes(play_list: &str) -> Vec<Episode> {
    entries(play_list)
        .zip(1u32..)
        .map(|(text, number)| parse_entry(number, text))
        .collect()
}
