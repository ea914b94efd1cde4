pub mod api;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod mapping;
pub mod playlist;
pub mod route;
pub mod search;
pub mod session;
pub mod sources;
pub mod storage;
pub mod window;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::{Catalog, HttpCatalog, ListQuery, VideoPage, VideoRecord};
    pub use crate::config::Config;
    pub use crate::error::{CatalogError, SwitchError};
    pub use crate::playlist::Episode;
    pub use crate::route::{PlayRoute, SearchRoute};
    pub use crate::search::{Pagination, SearchResults};
    pub use crate::session::{LoadOutcome, LoadStatus, PlaySession, PlayState, SwitchOutcome};
    pub use crate::sources::{SourceDescriptor, SourceTable};
    pub use crate::storage::HistoryEntry;
    pub use crate::window::SourceWindow;
    pub use crate::Vodhub;
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::api::{Catalog, HttpCatalog, ListQuery, VideoPage};
use crate::config::Config;
use crate::db::Database;
use crate::route::{PlayRoute, SearchRoute};
use crate::search::{norm_query, SearchResults};
use crate::session::{PlaySession, SessionContext};
use crate::sources::{SourceDescriptor, SourceTable};
use crate::storage::{HistoryEntry, HistoryStore, Storage};
use crate::window::SourceWindow;

/// Async library entry point. Owns the database, the catalog client and the
/// configured source table.
pub struct Vodhub {
    db: Database,
    catalog: Arc<dyn Catalog>,
    sources: Arc<SourceTable>,
    config: Config,
}

impl Vodhub {
    /// Connect the database (optionally migrating) and build the HTTP catalog.
    pub async fn connect(config: Config, run_migrations: bool) -> Result<Self> {
        let db = Database::connect(config.database_url.as_deref()).await?;
        if run_migrations { db.run_migrations().await?; }
        let catalog = Arc::new(HttpCatalog::new(&config.http)?);
        Self::with_parts(db, catalog, config)
    }

    /// Assemble from already-built parts.
    pub fn with_parts(db: Database, catalog: Arc<dyn Catalog>, config: Config) -> Result<Self> {
        config.validate()?;
        let sources = Arc::new(config.source_table().context("building source table")?);
        Ok(Self { db, catalog, sources, config })
    }

    pub fn database(&self) -> &Database { &self.db }
    pub fn config(&self) -> &Config { &self.config }
    pub fn sources(&self) -> &SourceTable { &self.sources }

    /// Source paging control starting at `start`.
    pub fn source_window(&self, start: usize) -> SourceWindow {
        SourceWindow::new(self.sources.len(), self.config.sources_per_page, start)
    }

    fn session_context(&self) -> SessionContext {
        SessionContext {
            catalog: self.catalog.clone(),
            history: Arc::new(self.db.clone()),
            sources: self.sources.clone(),
            sources_per_page: self.config.sources_per_page,
            default_source: self.config.default_source.clone(),
        }
    }

    /// Open a play session for `route`; call [`PlaySession::load`] next.
    pub async fn open_play(&self, route: &PlayRoute) -> PlaySession {
        PlaySession::open(self.session_context(), route).await
    }

    /// Source used for keyword listings.
    pub fn search_source(&self) -> Option<&SourceDescriptor> {
        self.sources.pick([self.config.default_source.as_deref()])
    }

    /// Run the search for `route`, serving cached pages unless `refresh`.
    /// Failures are logged and yield empty results.
    pub async fn search(&self, route: &SearchRoute, refresh: bool) -> SearchResults {
        let term = route.term.trim();
        if term.is_empty() {
            return SearchResults::empty(term, route.page);
        }
        let Some(source) = self.search_source() else {
            warn!("no sources configured; search skipped");
            return SearchResults::empty(term, route.page);
        };
        let query = ListQuery { keyword: term.to_string(), page: route.page, page_size: self.config.search_page_size };
        match self.list_cached(source, &query, refresh).await {
            Ok(listing) => SearchResults::from_page(term, route.page, &listing),
            Err(e) => {
                warn!(term = %term, error = %e, "search failed");
                SearchResults::empty(term, route.page)
            }
        }
    }

    async fn list_cached(&self, source: &SourceDescriptor, query: &ListQuery, refresh: bool) -> Result<VideoPage> {
        let key = format!("{}|videolist|{}|{}|{}", source.key, norm_query(&query.keyword), query.page, query.page_size);
        let now = current_epoch();
        if !refresh {
            match self.db.get_cache(&key, now).await {
                Ok(Some(payload)) => match serde_json::from_str::<VideoPage>(&payload) {
                    Ok(page) => {
                        debug!(key = %key, "search cache hit");
                        return Ok(page);
                    }
                    Err(e) => warn!(key = %key, error = %e, "discarding unreadable cache entry"),
                },
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "search cache read failed"),
            }
        }
        let page = self.catalog.list(source, query).await?;
        let payload = serde_json::to_string(&page)?;
        if let Err(e) = self.db.put_cache(&key, &payload, now + self.config.search_ttl_secs).await {
            warn!(key = %key, error = %e, "search cache write failed");
        }
        Ok(page)
    }

    pub async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>> { self.db.list_history(limit).await }
    pub async fn forget(&self, video_id: &str) -> Result<u64> { self.db.delete_history(video_id).await }
    pub async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64> { self.db.clear_cache_prefix(prefix).await }
    pub async fn purge_expired_cache(&self) -> Result<u64> { dao::purge_expired_cache(self.db.pool(), current_epoch()).await }
    pub async fn vacuum_db(&self) -> Result<()> { self.db.vacuum().await }
}

pub(crate) fn current_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
