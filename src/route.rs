//! Page addresses: `/play/{id}/{episode}/{source}` and `/search?q=..&page=..`.

use std::fmt;

use url::Url;

/// Address of the play view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRoute {
    pub video_id: String,
    pub episode: Option<u32>,
    pub source: Option<String>,
}

impl PlayRoute {
    pub fn new(video_id: impl Into<String>, episode: u32, source: impl Into<String>) -> Self {
        Self { video_id: video_id.into(), episode: Some(episode), source: Some(source.into()) }
    }

    /// Parse `/play/{id}[/{episode}[/{source}]]`. An unparsable episode is
    /// treated as missing.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segs = path.trim_matches('/').split('/').map(decode);
        if segs.next()?.as_deref() != Some("play") {
            return None;
        }
        let video_id = segs.next()??;
        if video_id.is_empty() {
            return None;
        }
        let episode = segs.next().flatten().and_then(|s| s.parse().ok()).filter(|n| *n > 0);
        let source = segs.next().flatten().filter(|s| !s.is_empty());
        Some(Self { video_id, episode, source })
    }

    pub fn episode_or_first(&self) -> u32 { self.episode.unwrap_or(1) }
}

impl fmt::Display for PlayRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/play/{}", urlencoding::encode(&self.video_id))?;
        match (&self.episode, &self.source) {
            (ep, Some(source)) => write!(f, "/{}/{}", ep.unwrap_or(1), urlencoding::encode(source)),
            (Some(ep), None) => write!(f, "/{ep}"),
            (None, None) => Ok(()),
        }
    }
}

/// Address of the search view. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoute {
    pub term: String,
    pub page: u32,
}

impl SearchRoute {
    pub fn new(term: impl Into<String>, page: u32) -> Self {
        Self { term: term.into(), page: page.max(1) }
    }

    /// Parse a search address or bare query string. Missing or invalid
    /// pages read as 1.
    pub fn parse(address: &str) -> Option<Self> {
        let base = Url::parse("http://localhost/").ok()?;
        let url = base.join(address).ok()?;
        let mut term = String::new();
        let mut page = 1;
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "q" => term = v.into_owned(),
                "page" => page = v.parse().ok().filter(|p| *p > 0).unwrap_or(1),
                _ => {}
            }
        }
        Some(Self { term, page })
    }

    pub fn with_page(&self, page: u32) -> Self { Self::new(self.term.clone(), page) }
}

impl fmt::Display for SearchRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/search?q={}&page={}", urlencoding::encode(&self.term), self.page)
    }
}

fn decode(seg: &str) -> Option<String> {
    urlencoding::decode(seg).ok().map(|s| s.into_owned())
}
