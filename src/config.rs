use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sources::{SourceDescriptor, SourceTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// sqlx database URL; the platform data dir is used when unset.
    pub database_url: Option<String>,
    /// Source used when neither the address nor history names one.
    pub default_source: Option<String>,
    pub sources_per_page: usize,
    pub search_page_size: u32,
    pub search_ttl_secs: i64,
    pub http: HttpConfig,
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            default_source: None,
            sources_per_page: 3,
            search_page_size: 24,
            search_ttl_secs: 60 * 60,
            http: HttpConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000, retries: 2, backoff_ms: 300 }
    }
}

impl Config {
    /// Load from `explicit`, else `$VODHUB_CONFIG`, else the platform config
    /// dir; defaults when none of them exist. Env overrides apply last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = match Self::locate(explicit)? {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config: {}", path.display()))?;
                Self::from_toml_str(&text).with_context(|| format!("parsing config: {}", path.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env_overrides(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(p) = explicit {
            if !p.exists() {
                bail!("config file not found: {}", p.display());
            }
            return Ok(Some(p.to_path_buf()));
        }
        if let Ok(p) = std::env::var("VODHUB_CONFIG") {
            let p = PathBuf::from(p);
            if !p.exists() {
                bail!("VODHUB_CONFIG points to a missing file: {}", p.display());
            }
            return Ok(Some(p));
        }
        let default = ProjectDirs::from("dev", "vodhub", "vodhub").map(|d| d.config_dir().join("config.toml"));
        Ok(default.filter(|p| p.exists()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("VODHUB_DATABASE_URL").filter(|s| !s.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(v) = var("VODHUB_SEARCH_TTL_SECS") {
            self.search_ttl_secs = v.parse().with_context(|| format!("VODHUB_SEARCH_TTL_SECS: {v}"))?;
        }
        if let Some(v) = var("VODHUB_HTTP_TIMEOUT_MS") {
            self.http.timeout_ms = v.parse().with_context(|| format!("VODHUB_HTTP_TIMEOUT_MS: {v}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources_per_page == 0 {
            bail!("sources_per_page must be at least 1");
        }
        if self.search_page_size == 0 {
            bail!("search_page_size must be at least 1");
        }
        if self.http.timeout_ms == 0 {
            bail!("http.timeout_ms must be positive");
        }
        // surfaces duplicate keys at load time
        self.source_table()?;
        Ok(())
    }

    pub fn source_table(&self) -> Result<SourceTable> {
        SourceTable::new(self.sources.clone())
    }
}
