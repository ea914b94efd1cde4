//! Search results page model.

use serde::{Deserialize, Serialize};

use crate::api::VideoPage;
use crate::mapping::{card_from, VideoCard};

/// Most page-number buttons shown at once.
pub const PAGE_BUTTONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub term: String,
    pub page: u32,
    pub total_pages: u32,
    pub cards: Vec<VideoCard>,
}

impl SearchResults {
    pub fn empty(term: &str, page: u32) -> Self {
        Self { term: term.to_string(), page: page.max(1), total_pages: 1, cards: Vec::new() }
    }

    pub fn from_page(term: &str, page: u32, listing: &VideoPage) -> Self {
        Self {
            term: term.to_string(),
            page: page.max(1),
            total_pages: u32::try_from(listing.page_count).unwrap_or(u32::MAX).max(1),
            cards: listing.items.iter().map(card_from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool { self.cards.is_empty() }

    pub fn pagination(&self) -> Pagination { Pagination::new(self.page, self.total_pages) }
}

/// Page controls under the result grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self { page: page.max(1), total_pages: total_pages.max(1) }
    }

    /// Controls are hidden for a single page.
    pub fn is_visible(&self) -> bool { self.total_pages > 1 }
    pub fn can_go_prev(&self) -> bool { self.page != 1 }
    pub fn can_go_next(&self) -> bool { self.page != self.total_pages }

    /// Up to five page numbers centred on the current page where possible.
    pub fn page_numbers(&self) -> Vec<u32> {
        let (page, total) = (self.page, self.total_pages);
        let first = if total <= PAGE_BUTTONS || page <= 3 {
            1
        } else if page >= total - 2 {
            total - (PAGE_BUTTONS - 1)
        } else {
            page - 2
        };
        (first..first + PAGE_BUTTONS.min(total)).collect()
    }
}

/// Lowercased, trimmed, whitespace-collapsed query used in cache keys.
pub fn norm_query(q: &str) -> String {
    let t = q.trim().to_lowercase();
    let mut o = String::with_capacity(t.len());
    let mut s = false;
    for c in t.chars() {
        if c.is_whitespace() {
            if !s { o.push(' '); s = true; }
        } else {
            o.push(c); s = false;
        }
    }
    o
}
