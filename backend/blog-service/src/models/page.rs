//! Fixed-size page windows over ordered listings.
//!
//! Requested page numbers are never an error: missing or garbage input means
//! the first page, numbers below 1 clamp to the first page and numbers past
//! the end clamp to the last one. An empty listing still has one (empty) page.

use serde::{Deserialize, Serialize};

/// 1-based page index as requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageNumber(u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(number: i64) -> Self {
        if number < 1 {
            Self::FIRST
        } else {
            PageNumber(u32::try_from(number).unwrap_or(u32::MAX))
        }
    }

    /// Parse a raw `?page=` value.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self::new)
            .unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Resolved slice of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: u32,
}

impl Paginator {
    /// `page_size` of 0 is treated as 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn num_pages(&self, total: i64) -> u32 {
        let size = i64::from(self.page_size);
        let pages = (total.max(0) + size - 1) / size;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    /// Clamp the requested page against `total` rows.
    pub fn window(&self, requested: PageNumber, total: i64) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = requested.get().clamp(1, num_pages);
        let limit = i64::from(self.page_size);
        PageWindow {
            number,
            num_pages,
            offset: i64::from(number - 1) * limit,
            limit,
        }
    }

    pub fn page<T>(&self, window: PageWindow, total: i64, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: window.number,
            num_pages: window.num_pages,
            page_size: self.page_size,
            total,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAGE_SIZE)
    }
}

/// One page of an ordered listing plus navigation metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
}
