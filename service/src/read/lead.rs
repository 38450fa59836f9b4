//! [`Lead`]-related read definitions.

use std::collections::BTreeMap;

use common::Percent;
use derive_more::{From, Into};

use crate::domain::lead;
#[cfg(doc)]
use crate::domain::Lead;

/// Distribution of [`Lead`]s over their [`lead::Status`]es.
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct StatusDistribution(pub BTreeMap<lead::Status, u64>);

/// Distribution of [`Lead`]s over their [`lead::Source`]s.
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct SourceDistribution(pub BTreeMap<lead::Source, u64>);

/// Conversion funnel metrics of the whole [`Lead`] base.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConversionMetrics {
    /// Total number of [`Lead`]s.
    pub total: u64,

    /// Number of [`Lead`]s in the [`Won`] status.
    ///
    /// [`Won`]: lead::Status::Won
    pub converted: u64,

    /// Share of converted [`Lead`]s, or [`None`] when there are no leads
    /// at all.
    pub conversion_rate: Option<Percent>,
}

impl ConversionMetrics {
    /// Computes [`ConversionMetrics`] from the given counters.
    #[must_use]
    pub fn new(total: u64, converted: u64) -> Self {
        Self {
            total,
            converted,
            conversion_rate: Percent::ratio(converted, total),
        }
    }
}

pub mod list {
    //! [`Lead`] list definitions.

    use std::str::FromStr;

    use common::{pagination, Money};
    use smart_default::SmartDefault;
    use strum::{Display, EnumString};

    use crate::domain::{lead, user};
    #[cfg(doc)]
    use crate::domain::Lead;

    /// [`pagination::Selector`] of a [`Lead`] list.
    pub type Selector = pagination::Selector<Filter, Sort>;

    /// Page of a [`Lead`] list.
    pub type Page = pagination::Page<lead::Id>;

    /// Filter for [`Selector`].
    ///
    /// All present criteria must hold at once.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`lead::Status`] to filter by.
        pub status: Option<lead::Status>,

        /// [`lead::Source`] to filter by.
        pub source: Option<lead::Source>,

        /// [`lead::Priority`] to filter by.
        pub priority: Option<lead::Priority>,

        /// [`lead::CustomerType`] to filter by.
        pub customer_type: Option<lead::CustomerType>,

        /// [`lead::ProjectType`] to filter by.
        pub project_type: Option<lead::ProjectType>,

        /// Assignee to filter by.
        pub assigned_to: Option<user::Id>,

        /// [`lead::State`] to filter by.
        pub state: Option<lead::State>,

        /// [`lead::District`] to filter by.
        pub district: Option<lead::District>,

        /// Inclusive lower budget bound.
        pub min_budget: Option<Money>,

        /// Inclusive upper budget bound.
        pub max_budget: Option<Money>,

        /// Inclusive lower [`lead::EnquiryDate`] bound.
        pub enquired_after: Option<lead::EnquiryDate>,

        /// Inclusive upper [`lead::EnquiryDate`] bound.
        pub enquired_before: Option<lead::EnquiryDate>,

        /// Free text fuzzy-searched across name, email and phone.
        pub search: Option<String>,
    }

    impl Filter {
        /// Indicates whether the given [`Lead`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, lead: &lead::Lead) -> bool {
            self.status.is_none_or(|s| lead.status == s)
                && self
                    .source
                    .as_ref()
                    .is_none_or(|s| lead.source.as_ref() == Some(s))
                && self.priority.is_none_or(|p| lead.priority == p)
                && self
                    .customer_type
                    .as_ref()
                    .is_none_or(|t| lead.customer_type.as_ref() == Some(t))
                && self
                    .project_type
                    .as_ref()
                    .is_none_or(|t| lead.project_type.as_ref() == Some(t))
                && self
                    .assigned_to
                    .is_none_or(|u| lead.assigned_to == Some(u))
                && self
                    .state
                    .as_ref()
                    .is_none_or(|s| lead.state.as_ref() == Some(s))
                && self
                    .district
                    .as_ref()
                    .is_none_or(|d| lead.district.as_ref() == Some(d))
                && self
                    .min_budget
                    .is_none_or(|min| lead.budget.is_some_and(|b| b >= min))
                && self
                    .max_budget
                    .is_none_or(|max| lead.budget.is_some_and(|b| b <= max))
                && self
                    .enquired_after
                    .is_none_or(|from| lead.date_of_enquiry >= from)
                && self
                    .enquired_before
                    .is_none_or(|to| lead.date_of_enquiry <= to)
                && self.search.as_ref().is_none_or(|text| {
                    let needle = text.to_lowercase();
                    let contains = |haystack: &str| {
                        haystack.to_lowercase().contains(&needle)
                    };
                    contains(lead.name.as_ref())
                        || lead
                            .email
                            .as_ref()
                            .is_some_and(|e| contains(e.as_ref()))
                        || lead
                            .phone
                            .as_ref()
                            .is_some_and(|p| contains(p.as_ref()))
                })
        }
    }

    /// Sorting of a [`Lead`] list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Sort {
        /// Field to sort by.
        pub field: SortField,

        /// Direction to sort in.
        pub order: pagination::Order,
    }

    /// Allow-list of [`Lead`] fields a list may be sorted by.
    ///
    /// Unknown field names are rejected at parse time via [`FromStr`].
    #[derive(
        Clone, Copy, Debug, Display, EnumString, Eq, PartialEq, SmartDefault,
    )]
    #[strum(serialize_all = "snake_case")]
    pub enum SortField {
        /// By creation time.
        #[default]
        CreatedAt,

        /// By last update time.
        UpdatedAt,

        /// By customer name.
        Name,

        /// By computed score.
        Score,

        /// By priority.
        Priority,

        /// By status.
        Status,

        /// By date of enquiry.
        DateOfEnquiry,

        /// By next scheduled follow-up.
        NextFollowUp,

        /// By budget.
        Budget,
    }

}

/// Marker selecting [`Lead`]s whose follow-up is overdue: the next
/// scheduled follow-up lies in the past and the status is not terminal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Overdue;
