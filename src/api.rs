//! Upstream catalog API: wire types and the HTTP client.
//!
//! Every source speaks the same JSON dialect: `?ac=detail&ids=..`,
//! `?ac=detail&wd=..` and `?ac=videolist&wd=..&pg=..&pagesize=..`, each
//! answering `{code, msg, page, pagecount, total, list: [...]}`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::HttpConfig;
use crate::error::CatalogError;
use crate::playlist;
use crate::sources::SourceDescriptor;

/// A video as the catalog describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(rename = "vod_id", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "vod_name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "vod_pic", default, deserialize_with = "lenient_string")]
    pub pic: String,
    #[serde(rename = "vod_year", default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(rename = "vod_area", default, deserialize_with = "lenient_string")]
    pub area: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_name: String,
    #[serde(rename = "vod_play_url", default, deserialize_with = "lenient_string")]
    pub play_url: String,
    #[serde(rename = "vod_score", default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(rename = "vod_content", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl VideoRecord {
    pub fn episode_count(&self) -> usize { playlist::episode_count(&self.play_url) }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoPage {
    #[serde(rename = "list", default, deserialize_with = "lenient_list")]
    pub items: Vec<VideoRecord>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: u64,
    #[serde(rename = "pagecount", default, deserialize_with = "lenient_u64")]
    pub page_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: u64,
}

/// Keyword listing request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    /// The `pg` value sent upstream; the listing endpoint is addressed one
    /// below the displayed page number.
    pub fn wire_page(&self) -> u32 { self.page.saturating_sub(1) }
}

/// Query interface of one upstream catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn detail(&self, source: &SourceDescriptor, id: &str) -> Result<Vec<VideoRecord>, CatalogError>;
    async fn search(&self, source: &SourceDescriptor, title: &str) -> Result<Vec<VideoRecord>, CatalogError>;
    async fn list(&self, source: &SourceDescriptor, query: &ListQuery) -> Result<VideoPage, CatalogError>;
}

/// reqwest-backed catalog with a request timeout and bounded retry.
pub struct HttpCatalog {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl HttpCatalog {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .connect_timeout(Duration::from_millis(cfg.timeout_ms.min(10_000)))
            .user_agent(concat!("vodhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, retries: cfg.retries, backoff: Duration::from_millis(cfg.backoff_ms) })
    }

    #[instrument(skip(self, source, params), fields(source = %source.key))]
    async fn fetch(&self, source: &SourceDescriptor, params: &[(&str, String)]) -> Result<VideoPage, CatalogError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(source, params).await {
                Ok(page) => {
                    debug!(items = page.items.len(), page_count = page.page_count, "catalog response");
                    return Ok(page);
                }
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = self.backoff.saturating_mul(1u32 << attempt.min(16));
                    warn!(attempt = attempt + 1, ?delay, error = %e, "transient catalog failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, source: &SourceDescriptor, params: &[(&str, String)]) -> Result<VideoPage, CatalogError> {
        let resp = self
            .client
            .get(&source.url)
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::from_reqwest(&source.key, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status { key: source.key.clone(), status: status.as_u16() });
        }
        let body = resp.text().await.map_err(|e| CatalogError::from_reqwest(&source.key, e))?;
        serde_json::from_str(&body).map_err(|error| CatalogError::Decode { key: source.key.clone(), error })
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn detail(&self, source: &SourceDescriptor, id: &str) -> Result<Vec<VideoRecord>, CatalogError> {
        let params = [("ac", "detail".to_string()), ("ids", id.to_string())];
        Ok(self.fetch(source, &params).await?.items)
    }

    async fn search(&self, source: &SourceDescriptor, title: &str) -> Result<Vec<VideoRecord>, CatalogError> {
        let params = [("ac", "detail".to_string()), ("wd", title.to_string())];
        Ok(self.fetch(source, &params).await?.items)
    }

    async fn list(&self, source: &SourceDescriptor, query: &ListQuery) -> Result<VideoPage, CatalogError> {
        let params = [
            ("ac", "videolist".to_string()),
            ("wd", query.keyword.clone()),
            ("pg", query.wire_page().to_string()),
            ("pagesize", query.page_size.to_string()),
        ];
        self.fetch(source, &params).await
    }
}

// --- lenient wire decoding: catalogs disagree on numbers vs strings ---

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        None => String::new(),
        Some(Scalar::Str(s)) => s,
        Some(Scalar::Int(n)) => n.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}

fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Str(s)) => s.trim().parse().ok(),
        Some(Scalar::Int(n)) => Some(n as f64),
        Some(Scalar::Float(f)) => Some(f),
        Some(Scalar::Bool(_)) | None => None,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Str(s)) => s.trim().parse().unwrap_or(0),
        Some(Scalar::Int(n)) => n.max(0) as u64,
        Some(Scalar::Float(f)) if f > 0.0 => f as u64,
        _ => 0,
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<VideoRecord>, D::Error> {
    Ok(Option::<Vec<VideoRecord>>::deserialize(d)?.unwrap_or_default())
}
