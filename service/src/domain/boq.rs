//! Bill-of-quantities definitions.


use common::{unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lead, project, quotation};

/// Bill-of-quantities line of a [`Project`], migrated from the accepted
/// [`Quotation`]'s items at conversion.
///
/// [`Project`]: super::Project
/// [`Quotation`]: super::Quotation
#[derive(Clone, Debug)]
pub struct Item {
    /// ID of this [`Item`].
    pub id: Id,

    /// ID of the [`Project`] this [`Item`] belongs to.
    ///
    /// [`Project`]: super::Project
    pub project_id: project::Id,

    /// [`WorkType`] grouping this [`Item`].
    pub work_type: WorkType,

    /// Free-text description of the work or material.
    pub description: lead::Text,

    /// Quantity of the work or material.
    pub quantity: quotation::Quantity,

    /// Measurement [`Unit`] of the quantity.
    pub unit: Unit,

    /// Rate per unit.
    pub unit_rate: Money,

    /// Total amount: quantity times unit rate.
    pub total: Money,

    /// Free-text note, naming the quotation this [`Item`] was migrated
    /// from.
    pub note: Option<lead::Text>,

    /// [`DateTime`] this [`Item`] was created at.
    pub created_at: CreationDateTime,
}

impl Item {
    /// Creates a new [`Item`] for the given [`Project`] by migrating a
    /// line of the given [`Quotation`], preserving its amounts as quoted.
    ///
    /// Migrated lines land under the default [`WorkType`] with a lump-sum
    /// [`Unit`].
    ///
    /// [`Project`]: super::Project
    /// [`Quotation`]: super::Quotation
    #[must_use]
    pub fn migrated(
        project_id: project::Id,
        quotation_number: &quotation::Number,
        item: &quotation::Item,
        at: CreationDateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            project_id,
            work_type: WorkType::default(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit: Unit::default(),
            unit_rate: item.unit_price,
            total: item.total_price,
            note: lead::Text::new(format!(
                "Migrated from quotation {quotation_number}",
            )),
            created_at: at,
        }
    }
}

/// ID of a bill-of-quantities [`Item`].
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

/// Work type grouping bill-of-quantities [`Item`]s.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct WorkType(String);

impl Default for WorkType {
    fn default() -> Self {
        Self("General Works".to_owned())
    }
}

impl FromStr for WorkType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (!s.trim().is_empty() && s.len() <= 255)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `WorkType`")
    }
}

/// Measurement unit of a bill-of-quantities [`Item`], e.g. `LS` (lump
/// sum), `sqft`, `cum`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Unit(String);

impl Default for Unit {
    fn default() -> Self {
        Self("LS".to_owned())
    }
}

impl FromStr for Unit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (!s.trim().is_empty() && s.len() <= 20)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `Unit`")
    }
}

/// [`DateTime`] when a bill-of-quantities [`Item`] was created.
pub type CreationDateTime = DateTimeOf<(Item, unit::Creation)>;
