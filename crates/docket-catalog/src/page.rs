//! Page number and page size to sequence-number window.
//!
//! Pages are 1-based. For page `p > 0` of size `s` over `total` documents
//! the window is `[(p - 1) * s + 1, min(p * s, total)]`. A page number of
//! zero or less selects everything, `[1, total]`. A page past the end
//! yields a window with `start > end`, which is empty but valid.
//!
//! Window computation is pure: it depends only on the request, the total,
//! and the default page size.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Page size used when a request asks for a page with size `<= 0`.
pub const DEFAULT_PAGE_SIZE: u64 = 15;

/// A request for one page of descriptors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number; `<= 0` requests every document.
    pub page_number: i64,
    /// Documents per page; `<= 0` falls back to the default size. Ignored
    /// when `page_number <= 0`.
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Request every registered document.
    pub fn all() -> Self {
        Self::new(0, 0)
    }

    /// Parse textual page number and page size, as received from a
    /// dispatch layer. Surrounding whitespace is ignored.
    pub fn parse(page_number: &str, page_size: &str) -> CatalogResult<Self> {
        Ok(Self::new(parse_field(page_number)?, parse_field(page_size)?))
    }

    /// Compute the window this request selects out of `total` documents.
    ///
    /// Infallible: a page whose start lies beyond `total`, including one
    /// beyond the 64-bit index range, is an empty window.
    pub fn window(&self, total: u64, default_page_size: u64) -> PageWindow {
        if self.page_number <= 0 {
            return PageWindow {
                start: 1,
                end: total,
                total,
            };
        }

        let size = if self.page_size <= 0 {
            default_page_size.max(1)
        } else {
            self.page_size as u64
        };
        let page = self.page_number as u64;

        // At most (2^63 - 2) * 2^64 + 2^64, which fits in u128.
        let start = u128::from(page - 1) * u128::from(size) + 1;
        let last = start + u128::from(size) - 1;

        if start > u128::from(total) {
            let start = u64::try_from(start).unwrap_or(u64::MAX);
            return PageWindow {
                start,
                end: total.min(start - 1),
                total,
            };
        }

        PageWindow {
            start: start as u64,
            end: last.min(u128::from(total)) as u64,
            total,
        }
    }
}

fn parse_field(input: &str) -> CatalogResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|e| CatalogError::InvalidPageRequest {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

/// Inclusive range of sequence numbers served for one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
    /// Document count the window was computed against.
    pub total: u64,
}

impl PageWindow {
    /// `true` when the window selects nothing (`start > end`).
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of sequence numbers in the window.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Sequence numbers in ascending order.
    pub fn indices(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }

    /// `true` when documents exist beyond this window.
    pub fn has_more(&self) -> bool {
        self.end < self.total
    }
}
