use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub key: String,
    pub name: String,
    /// Base URL of the catalog API, e.g. `https://host/api.php/provide/vod`.
    pub url: String,
}

/// Ordered, immutable key -> descriptor table. Built once from configuration
/// and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    sources: Vec<SourceDescriptor>,
}

impl SourceTable {
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self> {
        for (i, s) in sources.iter().enumerate() {
            if s.key.trim().is_empty() {
                bail!("source #{} has an empty key", i + 1);
            }
            if sources[..i].iter().any(|prev| prev.key == s.key) {
                bail!("duplicate source key: {}", s.key);
            }
        }
        Ok(Self { sources })
    }

    pub fn len(&self) -> usize { self.sources.len() }
    pub fn is_empty(&self) -> bool { self.sources.is_empty() }
    pub fn as_slice(&self) -> &[SourceDescriptor] { &self.sources }
    pub fn keys(&self) -> impl Iterator<Item = &str> { self.sources.iter().map(|s| s.key.as_str()) }

    pub fn get(&self, key: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.key == key)
    }

    pub fn contains(&self, key: &str) -> bool { self.get(key).is_some() }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.key == key)
    }

    /// The first of `candidates` that names a known source, falling back to
    /// the first source in the table.
    pub fn pick<'a, I>(&self, candidates: I) -> Option<&SourceDescriptor>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .find_map(|k| self.get(k))
            .or_else(|| self.sources.first())
    }
}
