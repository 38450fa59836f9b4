//! [`Query`] collection related to multiple [`Quotation`]s.

use common::operations::By;

use crate::{domain::lead, domain::Quotation, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all [`Quotation`]s of a lead, newest version first.
pub type ForLead = DatabaseQuery<By<Vec<Quotation>, lead::Id>>;

/// Queries a filtered page of [`Quotation`]s.
pub type List = DatabaseQuery<
    By<read::quotation::list::Page, read::quotation::list::Selector>,
>;
