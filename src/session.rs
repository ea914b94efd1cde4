//! Play page model: one video, its selected source and episode.
//!
//! Every catalog fetch takes a ticket from the session's generation counter.
//! A response is applied only while its ticket is still the newest, so a slow
//! answer to an older request can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{Catalog, VideoRecord};
use crate::current_epoch;
use crate::error::SwitchError;
use crate::mapping::history_entry_from;
use crate::playlist::{self, Episode};
use crate::route::PlayRoute;
use crate::sources::{SourceDescriptor, SourceTable};
use crate::storage::{HistoryEntry, HistoryStore};
use crate::window::SourceWindow;

/// Shared collaborators of every session.
#[derive(Clone)]
pub struct SessionContext {
    pub catalog: Arc<dyn Catalog>,
    pub history: Arc<dyn HistoryStore>,
    pub sources: Arc<SourceTable>,
    pub sources_per_page: usize,
    pub default_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    Loading,
    Ready,
    NotFound,
    /// The catalog could not be reached; retrying may help.
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayState {
    pub video_id: String,
    pub video: Option<VideoRecord>,
    pub selected_source: String,
    /// Source a switch is currently being attempted on.
    pub pending_source: Option<String>,
    pub episode: u32,
    pub status: LoadStatus,
    pub window: SourceWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
    Unavailable,
    /// A newer request superseded this one; nothing changed.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched(PlayRoute),
    Stale,
}

pub struct PlaySession {
    ctx: SessionContext,
    state: Mutex<PlayState>,
    generation: AtomicU64,
}

/// Title prefix used to find the same video on another source: everything
/// before the first ASCII space, then before the first full-width space.
pub fn search_keyword(title: &str) -> &str {
    let head = title.split(' ').next().unwrap_or_default();
    let head = head.split('\u{3000}').next().unwrap_or_default();
    if head.is_empty() { title.trim() } else { head }
}

/// A failed switch keeps the current video, so a reload it superseded must
/// not leave the session stuck in `Loading`.
fn settle(st: &mut PlayState) {
    if st.status == LoadStatus::Loading && st.video.is_some() {
        st.status = LoadStatus::Ready;
    }
}

impl PlaySession {
    /// Build a session for `route`. The source comes from the route when it
    /// names a known key, else from watch history, else the configured
    /// default, else the first configured source.
    pub async fn open(ctx: SessionContext, route: &PlayRoute) -> Self {
        let explicit = route.source.as_deref().filter(|k| ctx.sources.contains(k));
        let remembered = if explicit.is_some() {
            None
        } else {
            match ctx.history.find_history(&route.video_id).await {
                Ok(entry) => entry.map(|e| e.source_key),
                Err(e) => {
                    warn!(video_id = %route.video_id, error = %e, "history lookup failed");
                    None
                }
            }
        };
        let selected = ctx
            .sources
            .pick([explicit, remembered.as_deref(), ctx.default_source.as_deref()])
            .map(|s| s.key.clone())
            .unwrap_or_default();
        let position = ctx.sources.position(&selected).unwrap_or(0);
        let window = SourceWindow::containing(ctx.sources.len(), ctx.sources_per_page, position);
        debug!(video_id = %route.video_id, source = %selected, "opening play session");

        let state = PlayState {
            video_id: route.video_id.clone(),
            video: None,
            selected_source: selected,
            pending_source: None,
            episode: route.episode_or_first(),
            status: LoadStatus::Loading,
            window,
        };
        Self { ctx, state: Mutex::new(state), generation: AtomicU64::new(0) }
    }

    fn lock(&self) -> MutexGuard<'_, PlayState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> u64 { self.generation.fetch_add(1, Ordering::SeqCst) + 1 }

    fn is_current(&self, ticket: u64) -> bool { self.generation.load(Ordering::SeqCst) == ticket }

    async fn record(&self, entry: HistoryEntry) {
        if let Err(e) = self.ctx.history.upsert_history(&entry).await {
            warn!(video_id = %entry.video_id, error = %e, "failed to record watch history");
        }
    }

    /// Fetch the video by id from the selected source.
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.begin();
        let (video_id, key) = {
            let mut st = self.lock();
            st.status = LoadStatus::Loading;
            // supersedes any switch still in flight
            st.pending_source = None;
            (st.video_id.clone(), st.selected_source.clone())
        };
        let Some(source) = self.ctx.sources.get(&key).cloned() else {
            warn!(source = %key, "no source configured to load from");
            let mut st = self.lock();
            if self.is_current(ticket) {
                st.status = LoadStatus::NotFound;
            }
            return LoadOutcome::NotFound;
        };

        let result = self.ctx.catalog.detail(&source, &video_id).await;

        let entry = {
            let mut st = self.lock();
            if !self.is_current(ticket) {
                debug!(video_id = %video_id, source = %key, "dropping stale detail response");
                return LoadOutcome::Stale;
            }
            match result {
                Ok(list) => match list.into_iter().next() {
                    Some(video) => {
                        let entry = history_entry_from(&video, st.episode, &key, current_epoch());
                        info!(video_id = %video.id, title = %video.name, source = %key, "video loaded");
                        st.video = Some(video);
                        st.status = LoadStatus::Ready;
                        entry
                    }
                    None => {
                        info!(video_id = %video_id, source = %key, "video not found");
                        st.video = None;
                        st.status = LoadStatus::NotFound;
                        return LoadOutcome::NotFound;
                    }
                },
                Err(e) => {
                    warn!(video_id = %video_id, error = %e, "failed to fetch video detail");
                    st.status = LoadStatus::Unavailable(e.to_string());
                    return LoadOutcome::Unavailable;
                }
            }
        };
        self.record(entry).await;
        LoadOutcome::Loaded
    }

    /// Re-resolve the current video on another source by title search,
    /// keeping the episode number. On failure the previous source stays.
    pub async fn switch_source(&self, key: &str) -> Result<SwitchOutcome, SwitchError> {
        let source = self
            .ctx
            .sources
            .get(key)
            .cloned()
            .ok_or_else(|| SwitchError::UnknownSource(key.to_string()))?;
        let title = self.lock().video.as_ref().map(|v| v.name.clone()).ok_or(SwitchError::NothingLoaded)?;
        let keyword = search_keyword(&title).to_string();

        let ticket = self.begin();
        self.lock().pending_source = Some(key.to_string());
        info!(source = %key, keyword = %keyword, "switching source");

        let result = self.ctx.catalog.search(&source, &keyword).await;

        let (route, entry) = {
            let mut st = self.lock();
            if !self.is_current(ticket) {
                debug!(source = %key, "dropping stale switch response");
                return Ok(SwitchOutcome::Stale);
            }
            st.pending_source = None;
            let video = match result {
                Ok(list) => list.into_iter().next(),
                Err(error) => {
                    settle(&mut st);
                    warn!(source = %key, error = %error, "source switch failed, keeping {}", st.selected_source);
                    return Err(SwitchError::Unavailable { key: key.to_string(), error });
                }
            };
            let Some(video) = video else {
                settle(&mut st);
                info!(source = %key, keyword = %keyword, "no match on new source, keeping {}", st.selected_source);
                return Err(SwitchError::NoMatch { key: key.to_string(), title: keyword });
            };
            let entry = history_entry_from(&video, st.episode, key, current_epoch());
            st.video_id = video.id.clone();
            st.video = Some(video);
            st.selected_source = key.to_string();
            st.status = LoadStatus::Ready;
            (PlayRoute::new(st.video_id.clone(), st.episode, key), entry)
        };
        self.record(entry).await;
        Ok(SwitchOutcome::Switched(route))
    }

    /// Select episode `episode` of the loaded video. `None` when nothing is
    /// loaded or the number is out of range.
    pub async fn change_episode(&self, episode: u32) -> Option<PlayRoute> {
        let (route, entry) = {
            let mut st = self.lock();
            let video = st.video.as_ref()?;
            if episode == 0 || episode as usize > video.episode_count() {
                return None;
            }
            let entry = history_entry_from(video, episode, &st.selected_source, current_epoch());
            st.episode = episode;
            (PlayRoute::new(st.video_id.clone(), episode, st.selected_source.clone()), entry)
        };
        self.record(entry).await;
        Some(route)
    }

    pub fn state(&self) -> PlayState { self.lock().clone() }

    pub fn route(&self) -> PlayRoute {
        let st = self.lock();
        PlayRoute::new(st.video_id.clone(), st.episode, st.selected_source.clone())
    }

    /// Stream for the current episode, if the loaded play list has one.
    pub fn current_stream(&self) -> Option<Episode> {
        let st = self.lock();
        let video = st.video.as_ref()?;
        playlist::resolve(&video.play_url, st.episode).filter(|e| !e.url.is_empty())
    }

    /// Episode grid of the loaded video; recomputed from the current record.
    pub fn episodes(&self) -> Vec<Episode> {
        self.lock().video.as_ref().map(|v| playlist::episodes(&v.play_url)).unwrap_or_default()
    }

    pub fn visible_sources(&self) -> Vec<SourceDescriptor> {
        self.lock().window.visible(self.ctx.sources.as_slice()).to_vec()
    }

    pub fn window(&self) -> SourceWindow { self.lock().window }

    pub fn sources_prev(&self) -> SourceWindow {
        let mut st = self.lock();
        st.window.go_prev();
        st.window
    }

    pub fn sources_next(&self) -> SourceWindow {
        let mut st = self.lock();
        st.window.go_next();
        st.window
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;

    use crate::api::{ListQuery, VideoPage};
    use crate::error::CatalogError;

    /// Canned per-source answers, optionally slowed down or failing.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub videos: HashMap<String, Vec<VideoRecord>>,
        pub delays: HashMap<String, Duration>,
        pub failing: Vec<String>,
    }

    impl FakeCatalog {
        pub(crate) fn with(mut self, key: &str, video: VideoRecord) -> Self {
            self.videos.entry(key.to_string()).or_default().push(video);
            self
        }

        async fn answer(&self, source: &SourceDescriptor, matches: impl Fn(&VideoRecord) -> bool) -> Result<Vec<VideoRecord>, CatalogError> {
            if let Some(d) = self.delays.get(&source.key) {
                tokio::time::sleep(*d).await;
            }
            if self.failing.contains(&source.key) {
                return Err(CatalogError::Status { key: source.key.clone(), status: 503 });
            }
            Ok(self.videos.get(&source.key).into_iter().flatten().filter(|v| matches(*v)).cloned().collect())
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn detail(&self, source: &SourceDescriptor, id: &str) -> Result<Vec<VideoRecord>, CatalogError> {
            self.answer(source, |v| v.id == id).await
        }

        async fn search(&self, source: &SourceDescriptor, title: &str) -> Result<Vec<VideoRecord>, CatalogError> {
            self.answer(source, |v| v.name.contains(title)).await
        }

        async fn list(&self, source: &SourceDescriptor, query: &ListQuery) -> Result<VideoPage, CatalogError> {
            let items = self.answer(source, |v| v.name.contains(&query.keyword)).await?;
            Ok(VideoPage { total: items.len() as u64, page: u64::from(query.page), page_count: 1, items })
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryHistory {
        pub entries: Mutex<HashMap<String, HistoryEntry>>,
    }

    #[async_trait]
    impl HistoryStore for MemoryHistory {
        async fn upsert_history(&self, entry: &HistoryEntry) -> Result<()> {
            self.entries.lock().unwrap().insert(entry.video_id.clone(), entry.clone());
            Ok(())
        }

        async fn find_history(&self, video_id: &str) -> Result<Option<HistoryEntry>> {
            Ok(self.entries.lock().unwrap().get(video_id).cloned())
        }

        async fn list_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
            let mut all: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));
            all.truncate(limit);
            Ok(all)
        }

        async fn delete_history(&self, video_id: &str) -> Result<u64> {
            Ok(self.entries.lock().unwrap().remove(video_id).map_or(0, |_| 1))
        }
    }

    pub(crate) fn table(keys: &[&str]) -> Arc<SourceTable> {
        let sources = keys
            .iter()
            .map(|k| SourceDescriptor { key: k.to_string(), name: k.to_uppercase(), url: format!("http://{k}.test/api") })
            .collect();
        Arc::new(SourceTable::new(sources).unwrap())
    }

    pub(crate) fn video(id: &str, name: &str, episodes: usize) -> VideoRecord {
        let play_url = (1..=episodes)
            .map(|n| format!("第{n:02}集$http://{id}.test/{n}.m3u8"))
            .collect::<Vec<_>>()
            .join("#");
        VideoRecord { id: id.into(), name: name.into(), pic: format!("http://img/{id}.jpg"), play_url, ..Default::default() }
    }

    fn ctx(catalog: FakeCatalog, history: Arc<MemoryHistory>) -> SessionContext {
        SessionContext {
            catalog: Arc::new(catalog),
            history,
            sources: table(&["moyu", "hong", "feifan", "liangzi", "wolong"]),
            sources_per_page: 3,
            default_source: Some("moyu".into()),
        }
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with("moyu", video("52937", "斗破苍穹年番 第五季", 12))
            .with("hong", video("h-1", "斗破苍穹年番", 10))
            .with("wolong", video("w-9", "斗破苍穹年番", 2))
    }

    async fn loaded(history: Arc<MemoryHistory>, route: &str) -> PlaySession {
        let s = PlaySession::open(ctx(catalog(), history), &PlayRoute::parse(route).unwrap()).await;
        assert_eq!(s.load().await, LoadOutcome::Loaded);
        s
    }

    #[test]
    fn keyword_stops_at_either_space() {
        assert_eq!(search_keyword("斗破苍穹年番 第五季"), "斗破苍穹年番");
        assert_eq!(search_keyword("凡人修仙传　再别天南"), "凡人修仙传");
        assert_eq!(search_keyword("海贼王"), "海贼王");
        assert_eq!(search_keyword(" leading"), "leading");
    }

    #[tokio::test]
    async fn open_prefers_route_then_history_then_default() {
        let history = Arc::new(MemoryHistory::default());
        let s = PlaySession::open(ctx(catalog(), history.clone()), &PlayRoute::parse("/play/1/3/liangzi").unwrap()).await;
        assert_eq!(s.state().selected_source, "liangzi");
        assert_eq!(s.state().episode, 3);
        assert_eq!(s.window().start(), 2);

        let s = PlaySession::open(ctx(catalog(), history.clone()), &PlayRoute::parse("/play/1").unwrap()).await;
        assert_eq!(s.state().selected_source, "moyu");

        history
            .upsert_history(&HistoryEntry {
                video_id: "1".into(),
                title: "t".into(),
                image_url: String::new(),
                episode: 2,
                source_key: "feifan".into(),
                last_watched: 1,
            })
            .await
            .unwrap();
        let s = PlaySession::open(ctx(catalog(), history.clone()), &PlayRoute::parse("/play/1/1/unknown").unwrap()).await;
        assert_eq!(s.state().selected_source, "feifan");
    }

    #[tokio::test]
    async fn load_sets_video_and_records_history() {
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history.clone(), "/play/52937/2/moyu").await;

        assert_eq!(s.state().status, LoadStatus::Ready);
        let stream = s.current_stream().unwrap();
        assert_eq!(stream.label, "第02集");
        assert_eq!(stream.url, "http://52937.test/2.m3u8");
        assert_eq!(s.episodes().len(), 12);

        let entry = history.find_history("52937").await.unwrap().unwrap();
        assert_eq!(entry.source_key, "moyu");
        assert_eq!(entry.episode, 2);
    }

    #[tokio::test]
    async fn load_of_unknown_id_is_not_found() {
        let history = Arc::new(MemoryHistory::default());
        let s = PlaySession::open(ctx(catalog(), history.clone()), &PlayRoute::parse("/play/404/1/moyu").unwrap()).await;
        assert_eq!(s.load().await, LoadOutcome::NotFound);
        assert_eq!(s.state().status, LoadStatus::NotFound);
        assert!(s.current_stream().is_none());
        assert!(history.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_a_recoverable_state() {
        let history = Arc::new(MemoryHistory::default());
        let failing = FakeCatalog { failing: vec!["moyu".into()], ..catalog() };
        let s = PlaySession::open(ctx(failing, history), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        assert_eq!(s.load().await, LoadOutcome::Unavailable);
        assert!(matches!(s.state().status, LoadStatus::Unavailable(_)));
    }

    #[tokio::test]
    async fn switch_keeps_episode_number_and_moves_identity() {
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history.clone(), "/play/52937/4/moyu").await;

        let outcome = s.switch_source("hong").await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched(PlayRoute::new("h-1", 4, "hong")));

        let st = s.state();
        assert_eq!(st.selected_source, "hong");
        assert_eq!(st.video_id, "h-1");
        assert_eq!(st.episode, 4);
        assert_eq!(s.current_stream().unwrap().url, "http://h-1.test/4.m3u8");
        assert_eq!(s.route().to_string(), "/play/h-1/4/hong");

        let entry = history.find_history("h-1").await.unwrap().unwrap();
        assert_eq!((entry.source_key.as_str(), entry.episode), ("hong", 4));
    }

    #[tokio::test]
    async fn switch_searches_with_title_prefix() {
        // "斗破苍穹年番 第五季" only matches the hong record by its prefix
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history, "/play/52937/1/moyu").await;
        s.switch_source("hong").await.unwrap();
        assert_eq!(s.state().video.unwrap().name, "斗破苍穹年番");
    }

    #[tokio::test]
    async fn switch_without_match_keeps_source_and_history() {
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history.clone(), "/play/52937/2/moyu").await;
        let before = history.entries.lock().unwrap().clone();

        let err = s.switch_source("feifan").await.unwrap_err();
        assert!(matches!(err, SwitchError::NoMatch { .. }));
        assert!(err.is_retryable());

        let st = s.state();
        assert_eq!(st.selected_source, "moyu");
        assert_eq!(st.video_id, "52937");
        assert!(st.pending_source.is_none());
        assert_eq!(*history.entries.lock().unwrap(), before);
    }

    #[tokio::test]
    async fn switch_to_unreachable_source_rolls_back() {
        let history = Arc::new(MemoryHistory::default());
        let failing = FakeCatalog { failing: vec!["hong".into()], ..catalog() };
        let s = PlaySession::open(ctx(failing, history), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        s.load().await;

        let err = s.switch_source("hong").await.unwrap_err();
        assert!(matches!(err, SwitchError::Unavailable { .. }));
        assert_eq!(s.state().selected_source, "moyu");
    }

    #[tokio::test]
    async fn switch_rejects_unknown_source_and_empty_session() {
        let history = Arc::new(MemoryHistory::default());
        let s = PlaySession::open(ctx(catalog(), history), &PlayRoute::parse("/play/52937").unwrap()).await;
        assert!(matches!(s.switch_source("hong").await, Err(SwitchError::NothingLoaded)));
        s.load().await;
        assert!(matches!(s.switch_source("nope").await, Err(SwitchError::UnknownSource(_))));
    }

    #[tokio::test]
    async fn older_switch_finishing_last_is_dropped() {
        let history = Arc::new(MemoryHistory::default());
        let mut cat = catalog();
        cat.delays.insert("hong".into(), Duration::from_millis(100));
        let s = PlaySession::open(ctx(cat, history.clone()), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        s.load().await;

        let (slow, fast) = tokio::join!(s.switch_source("hong"), s.switch_source("wolong"));
        assert_eq!(slow.unwrap(), SwitchOutcome::Stale);
        assert_eq!(fast.unwrap(), SwitchOutcome::Switched(PlayRoute::new("w-9", 1, "wolong")));

        let st = s.state();
        assert_eq!(st.selected_source, "wolong");
        assert_eq!(st.video_id, "w-9");
        assert!(history.find_history("h-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_switch_during_reload_leaves_session_ready() {
        let history = Arc::new(MemoryHistory::default());
        let mut cat = catalog();
        cat.delays.insert("moyu".into(), Duration::from_millis(100));
        let s = PlaySession::open(ctx(cat, history), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        assert_eq!(s.load().await, LoadOutcome::Loaded);

        let (reload, switch) = tokio::join!(s.load(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.switch_source("feifan").await
        });
        assert_eq!(reload, LoadOutcome::Stale);
        assert!(matches!(switch, Err(SwitchError::NoMatch { .. })));

        let st = s.state();
        assert_eq!(st.status, LoadStatus::Ready);
        assert_eq!(st.selected_source, "moyu");
        assert_eq!(st.video_id, "52937");
        assert!(st.pending_source.is_none());
    }

    #[tokio::test]
    async fn unreachable_switch_during_reload_leaves_session_ready() {
        let history = Arc::new(MemoryHistory::default());
        let mut cat = FakeCatalog { failing: vec!["hong".into()], ..catalog() };
        cat.delays.insert("moyu".into(), Duration::from_millis(100));
        let s = PlaySession::open(ctx(cat, history), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        s.load().await;

        let (reload, switch) = tokio::join!(s.load(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.switch_source("hong").await
        });
        assert_eq!(reload, LoadOutcome::Stale);
        assert!(matches!(switch, Err(SwitchError::Unavailable { .. })));
        assert_eq!(s.state().status, LoadStatus::Ready);
    }

    #[tokio::test]
    async fn reload_during_switch_clears_pending_source() {
        let history = Arc::new(MemoryHistory::default());
        let mut cat = catalog();
        cat.delays.insert("hong".into(), Duration::from_millis(100));
        let s = PlaySession::open(ctx(cat, history.clone()), &PlayRoute::parse("/play/52937/1/moyu").unwrap()).await;
        s.load().await;

        let (switch, reload) = tokio::join!(s.switch_source("hong"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.load().await
        });
        assert_eq!(switch.unwrap(), SwitchOutcome::Stale);
        assert_eq!(reload, LoadOutcome::Loaded);

        let st = s.state();
        assert!(st.pending_source.is_none());
        assert_eq!(st.selected_source, "moyu");
        assert_eq!(st.status, LoadStatus::Ready);
        assert!(history.find_history("h-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn change_episode_checks_range() {
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history.clone(), "/play/w-9/1/wolong").await;

        assert!(s.change_episode(0).await.is_none());
        assert!(s.change_episode(3).await.is_none());
        assert_eq!(s.change_episode(2).await, Some(PlayRoute::new("w-9", 2, "wolong")));
        assert_eq!(history.find_history("w-9").await.unwrap().unwrap().episode, 2);
    }

    #[tokio::test]
    async fn episode_beyond_new_source_has_nothing_to_play() {
        let history = Arc::new(MemoryHistory::default());
        let s = loaded(history, "/play/52937/11/moyu").await;
        s.switch_source("hong").await.unwrap();
        assert_eq!(s.state().episode, 11);
        assert!(s.current_stream().is_none());
    }

    #[tokio::test]
    async fn source_window_pages_through_table() {
        let history = Arc::new(MemoryHistory::default());
        let s = PlaySession::open(ctx(catalog(), history), &PlayRoute::parse("/play/1").unwrap()).await;
        let keys = |s: &PlaySession| s.visible_sources().into_iter().map(|d| d.key).collect::<Vec<_>>();
        assert_eq!(keys(&s), vec!["moyu", "hong", "feifan"]);
        assert!(s.sources_next().can_go_prev());
        assert_eq!(keys(&s), vec!["feifan", "liangzi", "wolong"]);
        assert!(!s.window().can_go_next());
        s.sources_prev();
        assert_eq!(s.window().start(), 0);
    }
}
