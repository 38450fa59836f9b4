//! Scoring audit trail definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lead, score, user};

/// Immutable record of a single scoring event of a [`Lead`].
///
/// Appended whenever scoring produces a different score or category than the
/// lead currently carries, and never mutated or deleted afterwards.
///
/// [`Lead`]: super::Lead
#[derive(Clone, Debug)]
pub struct Record {
    /// ID of this [`Record`].
    pub id: Id,

    /// ID of the [`Lead`] this [`Record`] belongs to.
    ///
    /// A reference, not ownership: the record outlives any edit of the lead.
    ///
    /// [`Lead`]: super::Lead
    pub lead_id: lead::Id,

    /// [`score::Score`] before the event.
    pub previous_score: score::Score,

    /// [`score::Score`] after the event.
    pub new_score: score::Score,

    /// [`score::Category`] before the event.
    pub previous_category: score::Category,

    /// [`score::Category`] after the event.
    pub new_category: score::Category,

    /// Breakdown of the [`score::Factors`] the new score is made of.
    pub factors: score::Factors,

    /// Free-text reason of the event.
    ///
    /// [`None`] for automatic recalculations.
    pub reason: Option<Reason>,

    /// [`User`] who triggered the event.
    ///
    /// [`None`] means the score was computed by the system.
    ///
    /// [`User`]: super::User
    pub scored_by: Option<user::Id>,

    /// [`DateTime`] when the event happened.
    pub scored_at: ScoredDateTime,
}

/// ID of a [`Record`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Free-text reason of a scoring event.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`] if the given `reason` is non-empty.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        (!reason.trim().is_empty() && reason.len() <= 1000)
            .then_some(Self(reason))
    }
}

/// [`DateTime`] when a scoring event happened.
pub type ScoredDateTime = DateTimeOf<(Record, unit::Scoring)>;
