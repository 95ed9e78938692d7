//! Offset pagination for owner listings.

use serde::{Deserialize, Serialize};

/// A page of an owner listing.
///
/// Listings are ordered by creation time, newest first, with the record
/// identifier (descending) as tie-breaker so that page boundaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of records to skip.
    pub offset: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Returns the first page with the given size.
    #[must_use]
    pub const fn first(limit: usize) -> Self {
        Self::new(limit, 0)
    }

    /// Returns the page following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.limit, self.offset.saturating_add(self.limit))
    }

    /// Applies configured limits: a zero limit becomes `default_size` and
    /// anything above `max_size` is clamped.
    #[must_use]
    pub fn clamped(self, limits: PageLimits) -> Self {
        let limit = if self.limit == 0 {
            limits.default_size
        } else {
            self.limit
        };
        Self::new(limit.min(limits.max_size), self.offset)
    }
}

/// Page size limits applied by services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageLimits {
    /// Size used when a caller asks for a zero-sized page.
    pub default_size: usize,
    /// Largest page a caller may request.
    pub max_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

/// Slices an already ordered iterator according to `page`.
pub(crate) fn paginate<T>(items: impl IntoIterator<Item = T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect()
}
