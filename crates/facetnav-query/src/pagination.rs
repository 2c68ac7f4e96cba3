//! Bounded page-link window with gap markers.

use serde::{Deserialize, Serialize};

/// Default number of pages around the current one.
pub const DEFAULT_WIDTH: u32 = 5;

/// Label of a gap marker.
pub const GAP_LABEL: &str = "…";

/// One entry of a page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    /// Link to a page.
    Page(u32),
    /// Elided run of pages.
    Gap,
}

impl PageLink {
    /// Display label.
    pub fn label(&self) -> String {
        match self {
            PageLink::Page(page) => page.to_string(),
            PageLink::Gap => GAP_LABEL.to_string(),
        }
    }

    /// Page number, if this is a link.
    pub fn page(&self) -> Option<u32> {
        match self {
            PageLink::Page(page) => Some(*page),
            PageLink::Gap => None,
        }
    }
}

/// Page links to render for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// Current page, clamped into range.
    pub current: u32,
    /// Links in display order.
    pub links: Vec<PageLink>,
    /// Whether a gap follows the leading `1`.
    pub has_leading_gap: bool,
    /// Whether the window ends in a gap.
    pub has_trailing_gap: bool,
}

impl PageWindow {
    /// Compute the window.
    ///
    /// `left = max(current - width / 2, 1)` and
    /// `right = min(left + width, total)`, both inclusive. Page 1 is always
    /// shown, behind a gap unless `left == 2`. A known `total` outside the
    /// window is shown behind a gap; an unknown total leaves an open gap at
    /// the end.
    pub fn new(current: u32, total: Option<u32>, width: u32) -> Self {
        let total = total.map(|total| total.max(1));
        let current = match total {
            Some(total) => current.clamp(1, total),
            None => current.max(1),
        };

        let left = current.saturating_sub(width / 2).max(1);
        let right = left.saturating_add(width).min(total.unwrap_or(u32::MAX));

        let mut links = Vec::with_capacity((right - left) as usize + 4);
        let mut has_leading_gap = false;
        if left > 1 {
            links.push(PageLink::Page(1));
            if left > 2 {
                links.push(PageLink::Gap);
                has_leading_gap = true;
            }
        }

        links.extend((left..=right).map(PageLink::Page));

        let has_trailing_gap = total != Some(right);
        if has_trailing_gap {
            links.push(PageLink::Gap);
            if let Some(total) = total {
                links.push(PageLink::Page(total));
            }
        }

        Self {
            current,
            links,
            has_leading_gap,
            has_trailing_gap,
        }
    }

    /// Display labels, with `…` for gaps.
    pub fn labels(&self) -> Vec<String> {
        self.links.iter().map(PageLink::label).collect()
    }

    /// Whether `link` is the current page.
    pub fn is_current(&self, link: &PageLink) -> bool {
        link.page() == Some(self.current)
    }
}

/// [`PageWindow::new`] with the default width.
pub fn window(current: u32, total: Option<u32>) -> PageWindow {
    PageWindow::new(current, total, DEFAULT_WIDTH)
}
