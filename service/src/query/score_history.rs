//! [`Query`] collection related to the score history of [`Lead`]s.

use common::operations::By;

use crate::{
    domain::{lead, score_history},
    read,
};
#[cfg(doc)]
use crate::{domain::Lead, Query};

use super::DatabaseQuery;

/// Queries all [`score_history::Record`]s of a lead, newest first.
pub type ForLead = DatabaseQuery<By<Vec<score_history::Record>, lead::Id>>;

/// Queries the latest [`score_history::Record`] of a lead.
pub type Latest =
    DatabaseQuery<By<Option<read::score_history::Latest>, lead::Id>>;

/// Queries the number of [`score_history::Record`]s of a lead.
pub type Count = DatabaseQuery<By<read::score_history::Count, lead::Id>>;
