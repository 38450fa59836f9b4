//! Activity log definitions.

use common::{define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lead, project, user};

/// Entry of the activity log, recording a noteworthy action performed on
/// a [`Lead`].
///
/// Written best-effort: failing to record an entry never fails the action
/// that produced it. Conversion re-links a lead's entries to also
/// reference the new [`Project`].
///
/// [`Lead`]: super::Lead
/// [`Project`]: super::Project
#[derive(Clone, Debug)]
pub struct Record {
    /// ID of this [`Record`].
    pub id: Id,

    /// ID of the [`Lead`] the action was performed on.
    ///
    /// [`Lead`]: super::Lead
    pub lead_id: lead::Id,

    /// ID of the [`Project`] this [`Record`] was re-linked to at
    /// conversion.
    ///
    /// [`Project`]: super::Project
    pub project_id: Option<project::Id>,

    /// [`Kind`] of the performed action.
    pub kind: Kind,

    /// Short human-readable [`Title`] of the action.
    pub title: Title,

    /// Longer free-text description of the action.
    pub description: Option<lead::Text>,

    /// [`User`] who performed the action.
    ///
    /// [`User`]: super::User
    pub actor: Option<user::Id>,

    /// [`DateTime`] the action was performed at.
    pub occurred_at: OccurrenceDateTime,
}

/// ID of an activity [`Record`].
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

/// Title of an activity [`Record`].
///
/// Free-form: titles are composed by the engine itself, never parsed.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Title(String);

define_kind! {
    #[doc = "Kind of an action recorded in the activity log."]
    enum Kind {
        #[doc = "A lead was created."]
        LeadCreated = 1,

        #[doc = "A lead was assigned to a user."]
        LeadAssigned = 2,

        #[doc = "A lead's fields were updated."]
        LeadUpdated = 3,

        #[doc = "A lead's status changed."]
        StatusChanged = 4,

        #[doc = "A quotation was created."]
        QuotationCreated = 5,

        #[doc = "A quotation was sent."]
        QuotationSent = 6,

        #[doc = "A quotation was accepted or rejected."]
        QuotationResponded = 7,

        #[doc = "A lead was converted into a customer and project."]
        LeadConverted = 8,
    }
}

/// [`DateTime`] when a logged action occurred.
pub type OccurrenceDateTime = DateTimeOf<(Record, unit::Creation)>;
