//! [`Query`] collection related to a single [`Lead`].

use common::operations::By;

use crate::domain::{lead, Lead};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Lead`] by its ID.
pub type ById = DatabaseQuery<By<Option<Lead>, lead::Id>>;
