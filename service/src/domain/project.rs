//! [`Project`] definitions.


use common::{define_kind, unit, DateOf, DateTimeOf, Money};
#[cfg(doc)]
use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{customer, lead, user};

/// Construction project opened for a converted [`Lead`].
///
/// [`Lead`]: super::Lead
#[derive(Clone, Debug)]
pub struct Project {
    /// ID of this [`Project`].
    pub id: Id,

    /// Unique generated [`Code`] of this [`Project`], e.g. `PRJ-2026-0042`.
    pub code: Code,

    /// Name of this [`Project`], derived from the lead's name and project
    /// type.
    pub name: Name,

    /// Free-text description carried over from the lead.
    pub description: Option<lead::Text>,

    /// ID of the [`Customer`] this [`Project`] is executed for.
    ///
    /// [`Customer`]: super::Customer
    pub customer_id: customer::Id,

    /// Type of construction, carried over from the lead.
    pub project_type: Option<lead::ProjectType>,

    /// Current [`Phase`] of this [`Project`].
    pub phase: Phase,

    /// Budget of this [`Project`], seeded from the accepted quotation's
    /// final amount or the lead's budget.
    pub budget: Option<Money>,

    /// Built-up area in square feet, carried over from the lead.
    pub sqft_area: Option<lead::Area>,

    /// Plot area in square feet, carried over from the lead.
    pub plot_area: Option<lead::Area>,

    /// Number of floors, carried over from the lead.
    pub floors: Option<lead::Floors>,

    /// Site location, carried over from the lead.
    pub location: Option<lead::Location>,

    /// State the site is located in, carried over from the lead.
    pub state: Option<lead::State>,

    /// District the site is located in, carried over from the lead.
    pub district: Option<lead::District>,

    /// [`Date`] this [`Project`] starts on.
    pub start_date: Option<StartDate>,

    /// ID of the [`Lead`] this [`Project`] originates from.
    ///
    /// [`Lead`]: super::Lead
    pub converted_from_lead: lead::Id,

    /// [`User`] who performed the conversion.
    ///
    /// [`User`]: super::User
    pub converted_by: Option<user::Id>,

    /// [`DateTime`] the conversion happened at.
    pub converted_at: ConversionDateTime,

    /// [`DateTime`] this [`Project`] was created at.
    pub created_at: CreationDateTime,
}

/// Membership of a [`User`] in a [`Project`]'s team.
///
/// [`User`]: super::User
#[derive(Clone, Debug)]
pub struct Member {
    /// ID of the [`Project`].
    pub project_id: Id,

    /// ID of the member [`User`].
    ///
    /// [`User`]: super::User
    pub user_id: user::Id,

    /// [`Role`] of the member within the [`Project`].
    pub role: Role,

    /// [`DateTime`] the membership was created at.
    pub added_at: MembershipDateTime,
}

/// ID of a [`Project`].
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

/// Unique human-readable code of a [`Project`], e.g. `PRJ-2026-0042`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Code(String);

impl Code {
    /// Generates a new [`Code`] from the given year and the value acquired
    /// from the project numbering sequence.
    #[must_use]
    pub fn generate(year: i32, sequence: u64) -> Self {
        Self(format!("PRJ-{year}-{sequence:04}"))
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (s.starts_with("PRJ-") && s.len() <= 50)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `Code`")
    }
}

/// Numbering sequence of [`Project`]s.
///
/// An [`Increment`] of it atomically acquires the next value.
///
/// [`Increment`]: common::operations::Increment
#[derive(Clone, Copy, Debug)]
pub struct Sequence;

/// Name of a [`Project`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Composes a [`Name`] for a project opened from the given lead, as
    /// `"<lead name> - <project type>"` falling back to
    /// `"<lead name> - Project"`.
    #[must_use]
    pub fn for_lead(
        lead_name: &lead::Name,
        project_type: Option<&lead::ProjectType>,
    ) -> Self {
        let suffix = project_type
            .map_or_else(|| "Project".to_owned(), ToString::to_string);
        Self(format!("{lead_name} - {suffix}"))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Phase a [`Project`] is currently in."]
    enum Phase {
        #[doc = "Freshly opened, work not started yet."]
        Planning = 1,

        #[doc = "Under execution."]
        InProgress = 2,

        #[doc = "Execution paused."]
        OnHold = 3,

        #[doc = "Handed over."]
        Completed = 4,

        #[doc = "Abandoned."]
        Cancelled = 5,
    }
}

define_kind! {
    #[doc = "Role of a [`Member`] within a [`Project`]."]
    enum Role {
        #[doc = "Manages the project."]
        ProjectManager = 1,

        #[doc = "Supervises the site."]
        SiteEngineer = 2,
    }
}

/// [`Date`] when a [`Project`] starts.
pub type StartDate = DateOf<(Project, unit::Start)>;

/// [`DateTime`] when a [`Project`] was created.
pub type CreationDateTime = DateTimeOf<(Project, unit::Creation)>;

/// [`DateTime`] when the conversion creating a [`Project`] happened.
pub type ConversionDateTime = DateTimeOf<(Project, unit::Conversion)>;

/// [`DateTime`] when a [`Member`] was added to a [`Project`].
pub type MembershipDateTime = DateTimeOf<(Member, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use crate::domain::lead;

    use super::{Code, Name};

    #[test]
    fn code_embeds_year_and_sequence() {
        assert_eq!(AsRef::<str>::as_ref(&Code::generate(2026, 42)), "PRJ-2026-0042");
    }

    #[test]
    fn name_falls_back_without_project_type() {
        let lead_name = lead::Name::new("Anil Kumar Rao").unwrap();
        assert_eq!(
            AsRef::<str>::as_ref(&Name::for_lead(
                &lead_name,
                Some(&lead::ProjectType::from_str("Residential").unwrap()),
            )),
            "Anil Kumar Rao - residential",
        );
        assert_eq!(
            AsRef::<str>::as_ref(&Name::for_lead(&lead_name, None)),
            "Anil Kumar Rao - Project",
        );
    }
}
