//! Abstractions for page-based pagination.

/// Arguments selecting a page of a listing.
#[derive(Clone, Copy, Debug)]
pub struct Arguments {
    /// 1-based number of the requested page.
    page: usize,

    /// Maximum number of nodes on the requested page.
    limit: usize,
}

impl Arguments {
    /// Default number of nodes per page.
    pub const DEFAULT_LIMIT: usize = 20;

    /// Hard cap on the number of nodes per page.
    pub const MAX_LIMIT: usize = 200;

    /// Creates new [`Arguments`], normalizing out-of-range values: a zero
    /// `page` becomes `1`, and `limit` is clamped into
    /// `1..=`[`MAX_LIMIT`].
    ///
    /// [`MAX_LIMIT`]: Self::MAX_LIMIT
    #[must_use]
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Returns the 1-based number of the requested page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the maximum number of nodes on the requested page.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of nodes preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of `N`odes in a listing.
#[derive(Clone, Debug)]
pub struct Page<N> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<N>,

    /// Total number of nodes matching the listing across all pages.
    pub total: u64,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<N> Page<N> {
    /// Indicates whether the listing has more nodes after this [`Page`].
    #[must_use]
    pub fn has_more(&self) -> bool {
        let seen = self.arguments.offset() + self.nodes.len();
        (seen as u64) < self.total
    }
}

/// Selector of a listing page: a domain `F`ilter, a `S`ort and the
/// pagination [`Arguments`].
#[derive(Clone, Debug)]
pub struct Selector<F, S = ()> {
    /// Additional filter applied to the listing.
    pub filter: F,

    /// Sorting applied to the listing.
    pub sort: S,

    /// Pagination [`Arguments`].
    pub arguments: Arguments,
}

/// Order of a sorted listing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    #[default]
    Descending,
}
