//! Fixed-width paging over the ordered source list.

use serde::{Deserialize, Serialize};

/// A contiguous slice `[start, start + width)` of `total` sources.
///
/// `start` always satisfies `start <= total.saturating_sub(width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWindow {
    total: usize,
    width: usize,
    start: usize,
}

impl SourceWindow {
    pub fn new(total: usize, width: usize, start: usize) -> Self {
        let width = width.max(1);
        Self { total, width, start: start.min(total.saturating_sub(width)) }
    }

    /// Window whose page contains `index`, aligned to multiples of `width`.
    pub fn containing(total: usize, width: usize, index: usize) -> Self {
        let width = width.max(1);
        Self::new(total, width, index - index % width)
    }

    pub fn total(&self) -> usize { self.total }
    pub fn width(&self) -> usize { self.width }
    pub fn start(&self) -> usize { self.start }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = (self.start + self.width).min(items.len());
        &items[start..end]
    }

    pub fn can_go_prev(&self) -> bool { self.start > 0 }

    pub fn can_go_next(&self) -> bool { self.start + self.width < self.total }

    pub fn prev_start(&self) -> usize { self.start.saturating_sub(self.width) }

    pub fn next_start(&self) -> usize {
        (self.start + self.width).min(self.total.saturating_sub(self.width))
    }

    pub fn go_prev(&mut self) { self.start = self.prev_start(); }

    pub fn go_next(&mut self) { self.start = self.next_start(); }
}
