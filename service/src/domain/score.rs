//! [`Lead`] quality scoring.
//!
//! Pure computation: no side effects, no I/O. Scoring is advisory and must
//! never block a [`Lead`] save, so the whole engine is infallible.
//!
//! [`Lead`]: super::Lead

use std::collections::BTreeMap;

use common::{define_kind, Money};
use derive_more::{Display, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lead;

/// Budget above which the "High Budget" factor applies.
const HIGH_BUDGET: Decimal = Decimal::from_parts(5_000_000, 0, 0, false, 0);

/// Budget above which the "Medium Budget" factor applies.
const MEDIUM_BUDGET: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Evaluates the quality score of a lead from its budget and source.
///
/// Additive point system; every applied factor is recorded by name. The
/// source factors are mutually exclusive, with `referral` checked before
/// `website`.
#[must_use]
pub fn evaluate(
    budget: Option<Money>,
    source: Option<&lead::Source>,
) -> Outcome {
    let mut factors = Factors::default();

    if let Some(budget) = budget {
        if budget.amount() > HIGH_BUDGET {
            factors.add("High Budget", 20);
        } else if budget.amount() > MEDIUM_BUDGET {
            factors.add("Medium Budget", 10);
        }
    }

    if let Some(source) = source {
        if source.contains("referral") {
            factors.add("Referral", 20);
        } else if source.contains("website") {
            factors.add("Organic", 10);
        }
    }

    let score = Score::clamped(factors.total());
    Outcome {
        category: Category::of(score),
        score,
        factors,
    }
}

/// Result of a scoring [`evaluate`]ion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outcome {
    /// Computed [`Score`].
    pub score: Score,

    /// [`Category`] the [`Score`] falls into.
    pub category: Category,

    /// Breakdown of the applied [`Factors`].
    pub factors: Factors,
}

/// Numeric quality score of a lead, within 0 to 100.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Score(u8);

impl Score {
    /// Upper bound of a [`Score`].
    pub const MAX: Self = Self(100);

    /// Creates a new [`Score`] if the given `value` doesn't exceed
    /// [`MAX`].
    ///
    /// [`MAX`]: Self::MAX
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    /// Creates a new [`Score`] from the given factor total, clamping it into
    /// the 0 to [`MAX`] range.
    ///
    /// The clamp keeps the score well-formed however many factors get added
    /// to the engine later.
    ///
    /// [`MAX`]: Self::MAX
    #[must_use]
    pub fn clamped(total: u16) -> Self {
        Self(u8::try_from(total).unwrap_or(u8::MAX).min(Self::MAX.0))
    }
}

define_kind! {
    #[doc = "Quality category a lead [`Score`] falls into."]
    enum Category {
        #[doc = "Score below 30."]
        Cold = 1,

        #[doc = "Score within 30 to 60."]
        Warm = 2,

        #[doc = "Score above 60."]
        Hot = 3,
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Cold
    }
}

impl Category {
    /// Returns the [`Category`] the given [`Score`] falls into.
    #[must_use]
    pub fn of(score: Score) -> Self {
        match u8::from(score) {
            61.. => Self::Hot,
            30..=60 => Self::Warm,
            0..=29 => Self::Cold,
        }
    }
}

/// Named breakdown of the points a lead score is made of.
#[derive(
    Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct Factors(BTreeMap<String, u8>);

impl Factors {
    /// Records the given factor.
    pub fn add(&mut self, name: impl Into<String>, points: u8) {
        let _ = self.0.insert(name.into(), points);
    }

    /// Returns the points recorded for the given factor, if any.
    #[must_use]
    pub fn points(&self, name: &str) -> Option<u8> {
        self.0.get(name).copied()
    }

    /// Returns the total of all recorded factors.
    #[must_use]
    pub fn total(&self) -> u16 {
        self.0.values().map(|p| u16::from(*p)).sum()
    }

    /// Indicates whether no factors are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
