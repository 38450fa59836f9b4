//! [`Lead`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateOf, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{score, user};

/// Prospective customer enquiry, tracked from intake until it is won
/// (converted into a project) or lost.
#[derive(Clone, Debug)]
pub struct Lead {
    /// ID of this [`Lead`].
    pub id: Id,

    /// [`Name`] of the enquiring customer.
    pub name: Name,

    /// [`Email`] of the enquiring customer.
    pub email: Option<Email>,

    /// [`Phone`] of the enquiring customer.
    pub phone: Option<Phone>,

    /// WhatsApp [`Phone`] of the enquiring customer.
    pub whatsapp: Option<Phone>,

    /// [`CustomerType`] of the enquiring customer.
    pub customer_type: Option<CustomerType>,

    /// [`ProjectType`] the enquiry is about.
    pub project_type: Option<ProjectType>,

    /// [`Source`] this [`Lead`] came from.
    pub source: Option<Source>,

    /// [`Priority`] of this [`Lead`].
    pub priority: Priority,

    /// Current [`Status`] of this [`Lead`].
    pub status: Status,

    /// Declared budget of the enquiry.
    pub budget: Option<Money>,

    /// Built-up area of the enquired project, in square feet.
    pub sqft_area: Option<Area>,

    /// Plot area of the enquired project, in square feet.
    pub plot_area: Option<Area>,

    /// Number of floors of the enquired project.
    pub floors: Option<Floors>,

    /// Free-text description of the enquired project.
    pub description: Option<Text>,

    /// Free-text customer requirements.
    pub requirements: Option<Text>,

    /// Free-text notes kept by the sales team.
    pub notes: Option<Text>,

    /// Reason this [`Lead`] was lost, if it was.
    pub lost_reason: Option<Text>,

    /// [`State`] the enquired project is located in.
    pub state: Option<State>,

    /// [`District`] the enquired project is located in.
    pub district: Option<District>,

    /// [`Location`] of the enquired project.
    pub location: Option<Location>,

    /// Full [`Address`] of the enquired project.
    pub address: Option<Address>,

    /// Star [`Rating`] given to the customer by the sales team.
    pub client_rating: Option<Rating>,

    /// Estimated probability to win this [`Lead`].
    pub probability_to_win: Option<Percent>,

    /// Derived quality [`score::Score`] of this [`Lead`].
    pub score: score::Score,

    /// Derived quality [`score::Category`] of this [`Lead`].
    pub score_category: score::Category,

    /// Breakdown of [`score::Factors`] the current score is made of.
    pub score_factors: score::Factors,

    /// [`User`] this [`Lead`] is assigned to.
    ///
    /// [`User`]: super::User
    pub assigned_to: Option<user::Id>,

    /// Display label of the assignee.
    pub assigned_team: Option<Team>,

    /// Calendar date of the enquiry.
    pub date_of_enquiry: EnquiryDate,

    /// [`DateTime`] of the last contact with the customer.
    pub last_contact_at: Option<ContactDateTime>,

    /// [`DateTime`] of the next scheduled follow-up.
    pub next_follow_up_at: Option<FollowUpDateTime>,

    /// [`DateTime`] this [`Lead`] was last scored at.
    pub last_scored_at: Option<ScoredDateTime>,

    /// [`DateTime`] this [`Lead`] was created at.
    pub created_at: CreationDateTime,

    /// [`DateTime`] this [`Lead`] was last updated at.
    pub updated_at: Option<UpdateDateTime>,

    /// [`DateTime`] this [`Lead`] was converted at, if it was.
    pub converted_at: Option<ConversionDateTime>,

    /// [`User`] who converted this [`Lead`], if anybody did.
    ///
    /// [`User`]: super::User
    pub converted_by: Option<user::Id>,
}

impl Lead {
    /// Reevaluates the quality score of this [`Lead`] from its current
    /// attributes, recording the given `at` as the scoring time.
    ///
    /// Returns the applied [`score::Outcome`] along with an indicator
    /// whether the score or category actually changed.
    pub fn rescore(&mut self, at: ScoredDateTime) -> (score::Outcome, bool) {
        let outcome = score::evaluate(self.budget, self.source.as_ref());
        let changed = outcome.score != self.score
            || outcome.category != self.score_category;

        self.score = outcome.score;
        self.score_category = outcome.category;
        self.score_factors = outcome.factors.clone();
        self.last_scored_at = Some(at);

        (outcome, changed)
    }
}

/// ID of a [`Lead`].
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

/// Name of the customer behind a [`Lead`].
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

/// Email address of the customer behind a [`Lead`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of the customer behind a [`Lead`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[\d\s-]{7,20}$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Source a [`Lead`] came from (`website`, `referral`, `walk_in`, ...).
///
/// An open set in practice, so it is kept as a normalized label rather than
/// a closed enum.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
pub struct Source(String);

impl Source {
    /// Creates a new [`Source`] from the given raw label, normalizing it to
    /// lowercase with underscores.
    ///
    /// [`None`] is returned if the label is empty or unreasonably long.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let normalized = normalize_label(raw.as_ref());
        (!normalized.is_empty() && normalized.len() <= 100)
            .then_some(Self(normalized))
    }

    /// Indicates whether this [`Source`] contains the given lowercase
    /// `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl FromStr for Source {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Source`")
    }
}

/// Type of the customer behind a [`Lead`] (`individual`, `business`,
/// `architect`, ...). An open set, kept as a normalized label.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct CustomerType(String);

impl CustomerType {
    /// Creates a new [`CustomerType`] from the given raw label, normalizing
    /// it to lowercase with underscores.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let normalized = normalize_label(raw.as_ref());
        (!normalized.is_empty() && normalized.len() <= 100)
            .then_some(Self(normalized))
    }
}

impl FromStr for CustomerType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CustomerType`")
    }
}

/// Type of the project a [`Lead`] enquires about (`residential`,
/// `commercial`, ...). An open set, kept as a normalized label.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct ProjectType(String);

impl ProjectType {
    /// Creates a new [`ProjectType`] from the given raw label, normalizing
    /// it to lowercase with underscores.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let normalized = normalize_label(raw.as_ref());
        (!normalized.is_empty() && normalized.len() <= 100)
            .then_some(Self(normalized))
    }
}

impl FromStr for ProjectType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ProjectType`")
    }
}

/// Display label of a [`Lead`] assignee.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Team(String);

impl Team {
    /// Creates a new [`Team`] if the given `label` is valid.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        Self::check(&label).then_some(Self(label))
    }

    /// Checks whether the given `label` is a valid [`Team`].
    fn check(label: impl AsRef<str>) -> bool {
        let label = label.as_ref();
        label.trim() == label && !label.is_empty() && label.len() <= 255
    }
}

impl FromStr for Team {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Team`")
    }
}

/// State (administrative region) a [`Lead`]'s project is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct State(String);

impl State {
    /// Creates a new [`State`] if the given `state` is valid.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Option<Self> {
        let state = state.into();
        Self::check(&state).then_some(Self(state))
    }

    /// Checks whether the given `state` is a valid [`State`].
    fn check(state: impl AsRef<str>) -> bool {
        let state = state.as_ref();
        state.trim() == state && !state.is_empty() && state.len() <= 100
    }
}

impl FromStr for State {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `State`")
    }
}

/// District a [`Lead`]'s project is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct District(String);

impl District {
    /// Creates a new [`District`] if the given `district` is valid.
    #[must_use]
    pub fn new(district: impl Into<String>) -> Option<Self> {
        let district = district.into();
        Self::check(&district).then_some(Self(district))
    }

    /// Checks whether the given `district` is a valid [`District`].
    fn check(district: impl AsRef<str>) -> bool {
        let district = district.as_ref();
        district.trim() == district
            && !district.is_empty()
            && district.len() <= 100
    }
}

impl FromStr for District {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `District`")
    }
}

/// Location of a [`Lead`]'s project within its [`District`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 255
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Full address of a [`Lead`]'s project.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// Free-text field of a [`Lead`] (description, requirements, notes,
/// lost reason).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is non-empty.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.trim().is_empty() && text.len() <= 10_000).then_some(Self(text))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// Area measured in square feet.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
pub struct Area(Decimal);

impl Area {
    /// Creates a new [`Area`] if the given `sqft` is positive.
    #[must_use]
    pub fn new(sqft: Decimal) -> Option<Self> {
        (sqft > Decimal::ZERO).then_some(Self(sqft))
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Area`")
    }
}

/// Number of floors of an enquired project.
pub type Floors = u16;

/// Star rating (1 to 5) given to a customer by the sales team.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
pub struct Rating(u8);

impl Rating {
    /// Creates a new [`Rating`] if the given `stars` are within 1 to 5.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }
}

define_kind! {
    #[doc = "Priority of a [`Lead`]."]
    enum Priority {
        #[doc = "Low priority."]
        Low = 1,

        #[doc = "Medium priority."]
        Medium = 2,

        #[doc = "High priority."]
        High = 3,
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Low
    }
}

impl Priority {
    /// Parses a [`Priority`] from the given raw label, normalizing case and
    /// whitespace first.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" | "urgent" => Some(Self::High),
            _ => None,
        }
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Lead`]."]
    enum Status {
        #[doc = "Fresh enquiry, nobody reached out yet."]
        NewInquiry = 1,

        #[doc = "The customer has been contacted."]
        Contacted = 2,

        #[doc = "The enquiry is qualified as a realistic opportunity."]
        Qualified = 3,

        #[doc = "A proposal/quotation has been sent to the customer."]
        ProposalSent = 4,

        #[doc = "The lead is converted into a project. Terminal, and only \
                 ever entered through the conversion."]
        Won = 5,

        #[doc = "The lead is lost. Terminal."]
        Lost = 6,
    }
}

impl Status {
    /// Parses a [`Status`] from the given raw label, mapping every known
    /// historical synonym (`"new"`, `"converted"`, `"qualified_lead"`, ...)
    /// to the canonical set.
    ///
    /// This is the single place status synonyms exist; every boundary
    /// normalizes through it instead of comparing raw strings.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "new" | "new_inquiry" | "new_enquiry" | "new_lead" => {
                Some(Self::NewInquiry)
            }
            "contacted" => Some(Self::Contacted),
            "qualified" | "qualified_lead" => Some(Self::Qualified),
            "proposal_sent" | "proposal" | "quotation_sent" => {
                Some(Self::ProposalSent)
            }
            "won" | "converted" => Some(Self::Won),
            "lost" | "closed_lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Indicates whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    /// Indicates whether an ordinary update may move a [`Lead`] from this
    /// [`Status`] into the given one.
    ///
    /// Terminal statuses accept no transitions, and [`Won`] is never entered
    /// through an update (the conversion is the one authorized setter).
    ///
    /// [`Won`]: Status::Won
    #[must_use]
    pub fn accepts_update_to(self, to: Self) -> bool {
        !self.is_terminal() && to != Self::Won
    }
}

/// Lowercases the given label and replaces whitespace and dashes with
/// underscores.
fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Calendar date when a [`Lead`] enquiry was made.
pub type EnquiryDate = DateOf<(Lead, unit::Enquiry)>;

/// [`DateTime`] when a [`Lead`] was created.
pub type CreationDateTime = DateTimeOf<(Lead, unit::Creation)>;

/// [`DateTime`] when a [`Lead`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Lead, unit::Update)>;

/// [`DateTime`] when a [`Lead`]'s customer was last contacted.
pub type ContactDateTime = DateTimeOf<(Lead, unit::Contact)>;

/// [`DateTime`] when a [`Lead`]'s next follow-up is scheduled.
pub type FollowUpDateTime = DateTimeOf<(Lead, unit::FollowUp)>;

/// [`DateTime`] when a [`Lead`] was last scored.
pub type ScoredDateTime = DateTimeOf<(Lead, unit::Scoring)>;

/// [`DateTime`] when a [`Lead`] was converted.
pub type ConversionDateTime = DateTimeOf<(Lead, unit::Conversion)>;
