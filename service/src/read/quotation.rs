//! [`Quotation`]-related read definitions.

use derive_more::Deref;

use crate::domain::quotation;
#[cfg(doc)]
use crate::domain::Quotation;

/// [`quotation::Version`] the next [`Quotation`] of a lead should get:
/// one past the highest existing version, or the first one.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct NextVersion(pub quotation::Version);

pub mod list {
    //! [`Quotation`] list definitions.

    use common::pagination;

    use crate::domain::{lead, quotation};
    #[cfg(doc)]
    use crate::domain::Quotation;

    /// [`pagination::Selector`] of a [`Quotation`] list.
    pub type Selector = pagination::Selector<Filter>;

    /// Page of a [`Quotation`] list.
    pub type Page = pagination::Page<quotation::Id>;

    /// Filter for [`Selector`].
    ///
    /// All present criteria must hold at once.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Lead the [`Quotation`]s belong to.
        pub lead_id: Option<lead::Id>,

        /// [`quotation::Status`] to filter by.
        pub status: Option<quotation::Status>,

        /// Free text fuzzy-searched across number and title.
        pub search: Option<String>,
    }

    impl Filter {
        /// Indicates whether the given [`Quotation`] satisfies this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, quotation: &quotation::Quotation) -> bool {
            self.lead_id.is_none_or(|id| quotation.lead_id == id)
                && self.status.is_none_or(|s| quotation.status == s)
                && self.search.as_ref().is_none_or(|text| {
                    let needle = text.to_lowercase();
                    let number: &str = quotation.number.as_ref();
                    let title: &str = quotation.title.as_ref();
                    number.to_lowercase().contains(&needle)
                        || title.to_lowercase().contains(&needle)
                })
        }
    }
}
