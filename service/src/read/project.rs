//! [`Project`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Lead, Project};

/// Indicator whether a [`Project`] converted from a given [`Lead`]
/// already exists.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct ExistsForLead(pub bool);

impl PartialEq<bool> for ExistsForLead {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
