//! Offset pagination and page-number windows.
//!
//! A [`Pager`] turns a total item count, a page size and the current page
//! into a `LIMIT offset,count` value and a short list of page links for
//! rendering, with `...` markers standing in for skipped ranges.
//!
//! The most recently constructed pager is kept in a process-wide slot and
//! can be read back with [`Pager::instance`].

use std::{
    fmt,
    sync::{LazyLock, PoisonError, RwLock},
};

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::{DbError, Result};

/// Pattern used when none is given; `{number}` is replaced by the page.
pub const DEFAULT_URL_PATTERN: &str = "?page={number}";
pub const DEFAULT_PER_PAGE: u64 = 10;
pub const DEFAULT_MAX_PAGES: u64 = 7;

static LAST_PAGER: LazyLock<RwLock<Option<Pager>>> = LazyLock::new(|| RwLock::new(None));

/// A page number, or the marker for a compressed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Page(u64),
    Ellipsis,
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageNumber::Page(n) => write!(f, "{n}"),
            PageNumber::Ellipsis => f.write_str("..."),
        }
    }
}

impl Serialize for PageNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PageNumber::Page(n) => serializer.serialize_u64(*n),
            PageNumber::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// One entry of [`Pager::pages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLink {
    pub number: PageNumber,
    /// `None` for ellipsis markers.
    pub url: Option<String>,
    pub is_current: bool,
}

/// Pagination state for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    total_items: u64,
    total_pages: u64,
    per_page: u64,
    current_page: u64,
    pattern: String,
    max_pages: u64,
}

impl Pager {
    /// Creates a pager and stores a copy of it as the process-wide instance.
    ///
    /// # Example
    ///
    /// ```
    /// use sqlgate_db::pager::{Pager, DEFAULT_URL_PATTERN};
    ///
    /// let pager = Pager::new(6, 2, 2, DEFAULT_URL_PATTERN);
    /// assert_eq!(pager.total_pages(), 3);
    /// assert_eq!(pager.limit(), "2,2");
    /// assert_eq!(pager.next_url().as_deref(), Some("?page=3"));
    /// ```
    pub fn new(
        total_items: u64,
        per_page: u64,
        current_page: u64,
        pattern: impl Into<String>,
    ) -> Self {
        let mut pager = Self {
            total_items,
            total_pages: 0,
            per_page,
            current_page,
            pattern: pattern.into(),
            max_pages: DEFAULT_MAX_PAGES,
        };
        pager.update_total_pages();

        *LAST_PAGER.write().unwrap_or_else(PoisonError::into_inner) = Some(pager.clone());
        pager
    }

    /// Returns a copy of the most recently constructed pager.
    ///
    /// The copy is taken at construction, so later setter calls on that
    /// pager do not show up here.
    ///
    /// # Errors
    ///
    /// [`DbError::PagerNotInitialized`] if no pager was constructed yet.
    pub fn instance() -> Result<Pager> {
        LAST_PAGER
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DbError::PagerNotInitialized)
    }

    /// Empties the process-wide slot.
    pub fn reset_instance() {
        *LAST_PAGER.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn update_total_pages(&mut self) {
        self.total_pages = if self.per_page == 0 {
            0
        } else {
            self.total_items.div_ceil(self.per_page)
        };
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn max_pages(&self) -> u64 {
        self.max_pages
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Sets how many page links [`Pager::pages`] may return before
    /// compressing. Values of 3 or less are ignored.
    pub fn set_max_pages(&mut self, max_pages: u64) -> &mut Self {
        if max_pages > 3 {
            self.max_pages = max_pages;
        } else {
            warn!(max_pages, "ignoring max pages of 3 or less");
        }
        self
    }

    pub fn set_current_page(&mut self, current_page: u64) -> &mut Self {
        self.current_page = current_page;
        self
    }

    pub fn set_per_page(&mut self, per_page: u64) -> &mut Self {
        self.per_page = per_page;
        self.update_total_pages();
        self
    }

    pub fn set_total_items(&mut self, total_items: u64) -> &mut Self {
        self.total_items = total_items;
        self.update_total_pages();
        self
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = pattern.into();
        self
    }

    /// Row offset of the first item on the current page. Page 0 is treated
    /// as page 1.
    pub fn offset(&self) -> u64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
    }

    /// The `offset,count` value for a SQL `LIMIT` clause.
    pub fn limit(&self) -> String {
        format!("{},{}", self.offset(), self.per_page)
    }

    pub fn page_url(&self, page: u64) -> String {
        self.pattern.replace("{number}", &page.to_string())
    }

    pub fn next_page(&self) -> Option<u64> {
        (self.current_page < self.total_pages).then(|| self.current_page + 1)
    }

    pub fn prev_page(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    pub fn next_url(&self) -> Option<String> {
        self.next_page().map(|page| self.page_url(page))
    }

    pub fn prev_url(&self) -> Option<String> {
        self.prev_page().map(|page| self.page_url(page))
    }

    /// Page links to render.
    ///
    /// Empty for a single page. Up to `max_pages` pages are listed in full;
    /// past that the first and last page are always shown, with a sliding
    /// window around the current page between them and an ellipsis wherever
    /// the window does not touch an end.
    pub fn pages(&self) -> Vec<PageLink> {
        if self.total_pages <= 1 {
            return vec![];
        }

        if self.total_pages <= self.max_pages {
            return (1..=self.total_pages).map(|n| self.link(n)).collect();
        }

        let total = self.total_pages;
        let max = self.max_pages;
        let current = self.current_page;
        let adjacents = max.saturating_sub(3) / 2;

        let near_end = current
            .checked_add(adjacents)
            .map_or(true, |reach| reach > total);
        let start = if near_end {
            (total - max).saturating_add(2)
        } else {
            current.saturating_sub(adjacents)
        }
        .max(2);
        let end = start
            .saturating_add(max.saturating_sub(3))
            .min(total - 1);

        let mut pages = Vec::with_capacity(end.saturating_sub(start) as usize + 5);
        pages.push(self.link(1));
        if start > 2 {
            pages.push(Self::ellipsis());
        }
        for n in start..=end {
            pages.push(self.link(n));
        }
        if end < total - 1 {
            pages.push(Self::ellipsis());
        }
        pages.push(self.link(self.total_pages));
        pages
    }

    fn link(&self, page: u64) -> PageLink {
        PageLink {
            number: PageNumber::Page(page),
            url: Some(self.page_url(page)),
            is_current: page == self.current_page,
        }
    }

    fn ellipsis() -> PageLink {
        PageLink {
            number: PageNumber::Ellipsis,
            url: None,
            is_current: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn numbers(pages: &[PageLink]) -> Vec<String> {
        pages.iter().map(|p| p.number.to_string()).collect()
    }

    #[test]
    #[serial]
    fn test_limit_and_total_pages() {
        let pager = Pager::new(6, 2, 1, DEFAULT_URL_PATTERN);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.limit(), "0,2");

        let pager = Pager::new(6, 2, 2, DEFAULT_URL_PATTERN);
        assert_eq!(pager.limit(), "2,2");
    }

    #[test]
    #[serial]
    fn test_huge_current_page() {
        let pager = Pager::new(100, 10, u64::MAX, DEFAULT_URL_PATTERN);
        assert_eq!(pager.offset(), u64::MAX);
        assert_eq!(pager.limit(), format!("{},10", u64::MAX));
        assert_eq!(pager.next_page(), None);
        assert_eq!(
            numbers(&pager.pages()),
            vec!["1", "...", "5", "6", "7", "8", "9", "10"]
        );
        assert!(pager.pages().iter().all(|p| !p.is_current));

        let pager = Pager::new(u64::MAX, 1, u64::MAX, DEFAULT_URL_PATTERN);
        assert_eq!(pager.offset(), u64::MAX - 1);
        let pages = pager.pages();
        assert_eq!(pages.len(), 8);
        assert_eq!(pages[2].number, PageNumber::Page(u64::MAX - 5));
        assert!(pages.last().is_some_and(|p| p.is_current));
    }

    #[test]
    #[serial]
    fn test_zero_per_page() {
        let pager = Pager::new(10, 0, 1, DEFAULT_URL_PATTERN);
        assert_eq!(pager.total_pages(), 0);
        assert!(pager.pages().is_empty());
        assert_eq!(pager.next_page(), None);
    }

    #[test]
    #[serial]
    fn test_setters_recompute_total_pages() {
        let mut pager = Pager::new(25, 10, 1, DEFAULT_URL_PATTERN);
        assert_eq!(pager.total_pages(), 3);

        pager.set_per_page(5);
        assert_eq!(pager.total_pages(), 5);

        pager.set_total_items(26);
        assert_eq!(pager.total_pages(), 6);

        pager.set_current_page(3).set_pattern("/posts/{number}");
        assert_eq!(pager.limit(), "10,5");
        assert_eq!(pager.page_url(4), "/posts/4");
    }

    #[test]
    #[serial]
    fn test_adjacent_pages() {
        let pager = Pager::new(30, 10, 1, "/p/{number}");
        assert_eq!(pager.prev_page(), None);
        assert_eq!(pager.prev_url(), None);
        assert_eq!(pager.next_page(), Some(2));
        assert_eq!(pager.next_url().as_deref(), Some("/p/2"));

        let pager = Pager::new(30, 10, 3, "/p/{number}");
        assert_eq!(pager.next_page(), None);
        assert_eq!(pager.next_url(), None);
        assert_eq!(pager.prev_url().as_deref(), Some("/p/2"));
    }

    #[test]
    #[serial]
    fn test_pages_single_page_is_empty() {
        assert!(Pager::new(0, 10, 1, DEFAULT_URL_PATTERN).pages().is_empty());
        assert!(Pager::new(10, 10, 1, DEFAULT_URL_PATTERN).pages().is_empty());
        assert!(Pager::new(3, 10, 5, DEFAULT_URL_PATTERN).pages().is_empty());
    }

    #[test]
    #[serial]
    fn test_pages_without_compression() {
        let pager = Pager::new(70, 10, 3, DEFAULT_URL_PATTERN);
        let pages = pager.pages();

        assert_eq!(numbers(&pages), vec!["1", "2", "3", "4", "5", "6", "7"]);
        assert_eq!(pages[2].url.as_deref(), Some("?page=3"));
        assert_eq!(pages.iter().filter(|p| p.is_current).count(), 1);
        assert!(pages[2].is_current);
    }

    #[test]
    #[serial]
    fn test_pages_window_in_the_middle() {
        let pager = Pager::new(200, 10, 10, DEFAULT_URL_PATTERN);
        assert_eq!(pager.total_pages(), 20);

        let pages = pager.pages();
        assert_eq!(
            numbers(&pages),
            vec!["1", "...", "8", "9", "10", "11", "12", "...", "20"]
        );
        assert_eq!(
            pages
                .iter()
                .filter(|p| p.number == PageNumber::Ellipsis)
                .count(),
            2
        );
        assert!(pages.iter().all(|p| (p.number == PageNumber::Ellipsis) == p.url.is_none()));

        let current: Vec<_> = pages.iter().filter(|p| p.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].number, PageNumber::Page(10));
    }

    #[test]
    #[serial]
    fn test_pages_window_at_edges() {
        let pager = Pager::new(200, 10, 1, DEFAULT_URL_PATTERN);
        assert_eq!(
            numbers(&pager.pages()),
            vec!["1", "2", "3", "4", "5", "6", "...", "20"]
        );

        let pager = Pager::new(200, 10, 20, DEFAULT_URL_PATTERN);
        assert_eq!(
            numbers(&pager.pages()),
            vec!["1", "...", "15", "16", "17", "18", "19", "20"]
        );
    }

    #[test]
    #[serial]
    fn test_set_max_pages() {
        let mut pager = Pager::new(200, 10, 10, DEFAULT_URL_PATTERN);
        pager.set_max_pages(3);
        assert_eq!(pager.max_pages(), DEFAULT_MAX_PAGES);

        pager.set_max_pages(5);
        assert_eq!(pager.max_pages(), 5);
        assert_eq!(numbers(&pager.pages()), vec!["1", "...", "9", "10", "11", "...", "20"]);
    }

    #[test]
    #[serial]
    fn test_instance_slot() {
        Pager::reset_instance();
        assert!(matches!(
            Pager::instance(),
            Err(DbError::PagerNotInitialized)
        ));

        let first = Pager::new(10, 5, 1, DEFAULT_URL_PATTERN);
        assert_eq!(Pager::instance().unwrap(), first);

        let second = Pager::new(40, 5, 2, DEFAULT_URL_PATTERN);
        assert_eq!(Pager::instance().unwrap(), second);
    }

    #[test]
    #[serial]
    fn test_serialize() {
        let pager = Pager::new(30, 10, 1, DEFAULT_URL_PATTERN);
        let json = serde_json::to_value(pager.pages()).unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({ "number": 1, "url": "?page=1", "isCurrent": true })
        );

        let pager = Pager::new(200, 10, 10, DEFAULT_URL_PATTERN);
        let json = serde_json::to_value(pager.pages()).unwrap();
        assert_eq!(
            json[1],
            serde_json::json!({ "number": "...", "url": null, "isCurrent": false })
        );
    }
}
