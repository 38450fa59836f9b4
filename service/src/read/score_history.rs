//! Score-history read definitions.

use derive_more::Deref;

use crate::domain::score_history;
#[cfg(doc)]
use crate::domain::Lead;

/// Number of [`score_history::Record`]s a [`Lead`] has accumulated.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct Count(pub u64);

/// Latest [`score_history::Record`] of a [`Lead`].
#[derive(Clone, Debug, Deref)]
pub struct Latest(pub score_history::Record);
