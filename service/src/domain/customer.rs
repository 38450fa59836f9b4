//! [`Customer`] definitions.


use common::{unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lead;

/// Client of the company, created from a converted [`Lead`].
///
/// [`Lead`]: super::Lead
#[derive(Clone, Debug)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// First name of this [`Customer`], split off the lead's full name.
    pub first_name: Name,

    /// Last name of this [`Customer`]. Leads with a single-word name get a
    /// `"."` placeholder.
    pub last_name: Name,

    /// Email address of this [`Customer`].
    pub email: lead::Email,

    /// Phone number of this [`Customer`].
    pub phone: Option<lead::Phone>,

    /// WhatsApp number of this [`Customer`].
    pub whatsapp: Option<lead::Phone>,

    /// Postal address of this [`Customer`].
    pub address: Option<lead::Address>,

    /// State this [`Customer`] resides in.
    pub state: Option<lead::State>,

    /// District this [`Customer`] resides in.
    pub district: Option<lead::District>,

    /// Source of the lead this [`Customer`] came from.
    pub source: Option<lead::Source>,

    /// Free-text notes carried over from the lead.
    pub notes: Option<lead::Text>,

    /// Hash of the generated temporary portal password.
    pub password_hash: PasswordHash,

    /// ID of the [`Lead`] this [`Customer`] was converted from.
    ///
    /// [`Lead`]: super::Lead
    pub lead_id: lead::Id,

    /// [`DateTime`] this [`Customer`] was created at.
    pub created_at: CreationDateTime,
}

/// Splits a lead's full name into a first and a last [`Name`] at the last
/// space, so `"Anil Kumar Rao"` becomes `("Anil Kumar", "Rao")`.
/// Single-word names get a `"."` placeholder surname.
#[must_use]
pub fn split_name(full: &lead::Name) -> (Name, Name) {
    let full: &str = full.as_ref();
    match full.rsplit_once(' ') {
        Some((first, last)) => (Name(first.to_owned()), Name(last.to_owned())),
        None => (Name(full.to_owned()), Name(".".to_owned())),
    }
}

/// ID of a [`Customer`].
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

/// First or last name of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        (!trimmed.is_empty() && trimmed.len() <= 255)
            .then(|| Self(trimmed.to_owned()))
            .ok_or("invalid `Name`")
    }
}

/// Temporary portal password generated for a new [`Customer`].
///
/// Only ever handled behind a [`SecretBox`], so it cannot end up in logs.
///
/// [`SecretBox`]: secrecy::SecretBox
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Generates a new random [`Password`].
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Hash of a [`Customer`]'s portal [`Password`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] from the given [`Password`].
    #[must_use]
    pub fn new(password: &Password) -> Self {
        // TODO: Use `argon2` or any other secure hashing algorithm.
        Self(password.to_string())
    }
}

/// [`DateTime`] when a [`Customer`] was created.
pub type CreationDateTime = DateTimeOf<(Customer, unit::Creation)>;
