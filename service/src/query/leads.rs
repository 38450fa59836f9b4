//! [`Query`] collection related to multiple [`Lead`]s.

use common::operations::By;

use crate::{domain::lead, read};
#[cfg(doc)]
use crate::{domain::Lead, Query};

use super::DatabaseQuery;

/// Queries a filtered, sorted page of [`Lead`]s.
pub type List =
    DatabaseQuery<By<read::lead::list::Page, read::lead::list::Selector>>;

/// Queries [`Lead`]s whose scheduled follow-up is overdue.
pub type Overdue = DatabaseQuery<By<Vec<lead::Id>, read::lead::Overdue>>;

/// Queries the distribution of [`Lead`]s over their statuses.
pub type StatusDistribution =
    DatabaseQuery<By<read::lead::StatusDistribution, ()>>;

/// Queries the distribution of [`Lead`]s over their sources.
pub type SourceDistribution =
    DatabaseQuery<By<read::lead::SourceDistribution, ()>>;

/// Queries conversion funnel metrics of the whole [`Lead`] base.
pub type ConversionMetrics =
    DatabaseQuery<By<read::lead::ConversionMetrics, ()>>;
