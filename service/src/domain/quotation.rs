//! [`Quotation`] definitions.


use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(doc)]
use common::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lead, user};

/// Versioned proposal sent to a [`Lead`].
///
/// [`Lead`]: super::Lead
#[derive(Clone, Debug)]
pub struct Quotation {
    /// ID of this [`Quotation`].
    pub id: Id,

    /// ID of the [`Lead`] this [`Quotation`] was prepared for.
    ///
    /// [`Lead`]: super::Lead
    pub lead_id: lead::Id,

    /// Unique generated [`Number`] of this [`Quotation`].
    pub number: Number,

    /// [`Version`] of this [`Quotation`] among the lead's quotations.
    pub version: Version,

    /// [`Title`] of this [`Quotation`].
    pub title: Title,

    /// Free-text description of this [`Quotation`].
    pub description: Option<lead::Text>,

    /// Current [`Status`] of this [`Quotation`].
    pub status: Status,

    /// Sum of all [`Item`] totals.
    pub total_amount: Money,

    /// Tax added on top of the total.
    pub tax_amount: Option<Money>,

    /// Discount subtracted from the total.
    pub discount_amount: Option<Money>,

    /// Final amount: total plus tax minus discount.
    ///
    /// Always recomputed from the items when items are present, never
    /// desynchronized manually.
    pub final_amount: Money,

    /// Number of days this [`Quotation`] stays valid after being sent.
    pub validity_days: ValidityDays,

    /// Free-text notes, including appended rejection reasons.
    pub notes: Option<lead::Text>,

    /// [`User`] who prepared this [`Quotation`].
    ///
    /// [`User`]: super::User
    pub created_by: Option<user::Id>,

    /// [`DateTime`] this [`Quotation`] was created at.
    pub created_at: CreationDateTime,

    /// [`DateTime`] this [`Quotation`] was last updated at.
    pub updated_at: Option<UpdateDateTime>,

    /// [`DateTime`] this [`Quotation`] was sent at.
    pub sent_at: Option<SentDateTime>,

    /// [`DateTime`] this [`Quotation`] was first viewed at.
    pub viewed_at: Option<ViewedDateTime>,

    /// [`DateTime`] the customer responded (accepted or rejected) at.
    pub responded_at: Option<RespondedDateTime>,

    /// Ordered line [`Item`]s of this [`Quotation`].
    pub items: Vec<Item>,
}

impl Quotation {
    /// Recomputes [`total_amount`] and [`final_amount`] of this
    /// [`Quotation`].
    ///
    /// When items are present, the total is the sum of their totals,
    /// overriding whatever the caller provided. The final amount is
    /// always the total plus tax minus discount, with the discount
    /// saturating at zero.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountOverflow`] error if the amounts don't fit.
    ///
    /// [`final_amount`]: Quotation::final_amount
    /// [`total_amount`]: Quotation::total_amount
    pub fn recompute_amounts(&mut self) -> Result<(), AmountOverflow> {
        if !self.items.is_empty() {
            self.total_amount =
                Money::checked_sum(self.items.iter().map(|i| i.total_price))
                    .ok_or(AmountOverflow)?;
        }

        let taxed = self
            .total_amount
            .checked_add(self.tax_amount.unwrap_or(Money::ZERO))
            .ok_or(AmountOverflow)?;
        self.final_amount =
            taxed.saturating_sub(self.discount_amount.unwrap_or(Money::ZERO));
        Ok(())
    }
}

/// Line item of a [`Quotation`].
#[derive(Clone, Debug)]
pub struct Item {
    /// ID of this [`Item`].
    pub id: ItemId,

    /// Free-text description of the quoted work or material.
    pub description: lead::Text,

    /// Quoted [`Quantity`].
    pub quantity: Quantity,

    /// Price per unit.
    pub unit_price: Money,

    /// Total price: quantity times unit price.
    pub total_price: Money,
}

impl Item {
    /// Creates a new [`Item`] with its total derived from the given
    /// quantity and unit price.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountOverflow`] error if the total doesn't fit.
    pub fn new(
        description: lead::Text,
        quantity: Quantity,
        unit_price: Money,
    ) -> Result<Self, AmountOverflow> {
        let total_price = unit_price
            .checked_mul(quantity.into())
            .ok_or(AmountOverflow)?;
        Ok(Self {
            id: ItemId::new(),
            description,
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// Error of a [`Quotation`] amount exceeding the representable range.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("quotation amount overflows")]
pub struct AmountOverflow;

/// ID of a [`Quotation`].
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

/// ID of a [`Quotation`] [`Item`].
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
pub struct ItemId(Uuid);

impl ItemId {
    /// Creates a new random [`ItemId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique human-readable number of a [`Quotation`], e.g.
/// `QUO-20260830-0007`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Number(String);

impl Number {
    /// Generates a new [`Number`] from the given issue date and the value
    /// acquired from the quotation numbering sequence.
    #[must_use]
    pub fn generate(issued_on: Date, sequence: u64) -> Self {
        Self(format!("QUO-{}-{sequence:04}", issued_on.to_compact()))
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (s.starts_with("QUO-") && s.len() <= 50)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `Number`")
    }
}

/// Numbering sequence of [`Quotation`]s.
///
/// An [`Increment`] of it atomically acquires the next value.
///
/// [`Increment`]: common::operations::Increment
#[derive(Clone, Copy, Debug)]
pub struct Sequence;

/// Version of a [`Quotation`] among the quotations of one lead, starting
/// at `1`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq,
    PartialOrd,
)]
pub struct Version(u32);

impl Version {
    /// First [`Version`] of a lead's quotations.
    pub const FIRST: Self = Self(1);

    /// Returns the [`Version`] following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Title of a [`Quotation`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 255
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Quantity of a quoted [`Item`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Creates a new [`Quantity`] if the given `quantity` is positive.
    #[must_use]
    pub fn new(quantity: Decimal) -> Option<Self> {
        (quantity > Decimal::ZERO).then_some(Self(quantity))
    }
}

impl FromStr for Quantity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Quantity`")
    }
}

/// Number of days a [`Quotation`] stays valid after being sent.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, PartialEq,
)]
pub struct ValidityDays(u16);

define_kind! {
    #[doc = "Status of a [`Quotation`]. Transitions are forward-only: \
             `DRAFT -> SENT -> VIEWED -> ACCEPTED | REJECTED`, where \
             `VIEWED` is optional."]
    enum Status {
        #[doc = "Being drafted, still mutable and deletable."]
        Draft = 1,

        #[doc = "Sent out to the customer."]
        Sent = 2,

        #[doc = "Opened by the customer at least once."]
        Viewed = 3,

        #[doc = "Accepted by the customer. Terminal."]
        Accepted = 4,

        #[doc = "Rejected by the customer. Terminal."]
        Rejected = 5,
    }
}

impl Status {
    /// Indicates whether this [`Status`] is terminal, forbidding any
    /// further mutation of the [`Quotation`].
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Indicates whether a [`Quotation`] in this [`Status`] may receive a
    /// customer response (accept or reject).
    #[must_use]
    pub fn accepts_response(self) -> bool {
        matches!(self, Self::Sent | Self::Viewed)
    }
}

/// [`DateTime`] when a [`Quotation`] was created.
pub type CreationDateTime = DateTimeOf<(Quotation, unit::Creation)>;

/// [`DateTime`] when a [`Quotation`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Quotation, unit::Update)>;

/// [`DateTime`] when a [`Quotation`] was sent.
pub type SentDateTime = DateTimeOf<(Quotation, unit::Sending)>;

/// [`DateTime`] when a [`Quotation`] was first viewed.
pub type ViewedDateTime = DateTimeOf<(Quotation, unit::Viewing)>;

/// [`DateTime`] when a [`Quotation`] was responded to.
pub type RespondedDateTime = DateTimeOf<(Quotation, unit::Response)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, Money};

    use crate::domain::lead;

    use super::{Number, Quantity, Status};

    #[test]
    fn number_embeds_date_and_sequence() {
        let date = Date::from_iso8601("2026-08-30").unwrap();
        assert_eq!(
            AsRef::<str>::as_ref(&Number::generate(date, 7)),
            "QUO-20260830-0007",
        );
        assert_eq!(
            AsRef::<str>::as_ref(&Number::generate(date, 12_345)),
            "QUO-20260830-12345",
        );
    }

    #[test]
    fn item_total_is_quantity_times_unit_price() {
        let item = super::Item::new(
            lead::Text::new("Earthwork").unwrap(),
            Quantity::from_str("2").unwrap(),
            Money::from_str("1000").unwrap(),
        )
        .unwrap();
        assert_eq!(item.total_price, Money::from_str("2000").unwrap());
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Accepted.is_terminal());
        assert!(Status::Rejected.is_terminal());
        assert!(!Status::Draft.is_terminal());
        assert!(!Status::Sent.is_terminal());
        assert!(!Status::Viewed.is_terminal());
    }

    #[test]
    fn responses_require_a_sent_quotation() {
        assert!(Status::Sent.accepts_response());
        assert!(Status::Viewed.accepts_response());
        assert!(!Status::Draft.accepts_response());
        assert!(!Status::Accepted.accepts_response());
        assert!(!Status::Rejected.accepts_response());
    }
}
