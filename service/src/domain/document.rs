//! [`Document`] definitions.


use common::{unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lead, project, user};

/// File attached to a [`Lead`] or a [`Project`].
///
/// Conversion copies a lead's documents to the new project, leaving the
/// originals in place.
///
/// [`Lead`]: super::Lead
/// [`Project`]: super::Project
#[derive(Clone, Debug)]
pub struct Document {
    /// ID of this [`Document`].
    pub id: Id,

    /// [`Owner`] this [`Document`] is attached to.
    pub owner: Owner,

    /// Original file name of this [`Document`].
    pub file_name: FileName,

    /// Opaque storage reference of the file contents.
    pub storage_key: StorageKey,

    /// Declared MIME type of the file.
    pub content_type: Option<ContentType>,

    /// Size of the file, in bytes.
    pub size: Option<u64>,

    /// [`User`] who uploaded this [`Document`].
    ///
    /// [`User`]: super::User
    pub uploaded_by: Option<user::Id>,

    /// [`DateTime`] this [`Document`] was uploaded at.
    pub uploaded_at: UploadDateTime,
}

impl Document {
    /// Creates a copy of this [`Document`] attached to the given
    /// [`Project`], pointing at the same stored file.
    ///
    /// [`Project`]: super::Project
    #[must_use]
    pub fn copied_to(&self, project_id: project::Id) -> Self {
        Self {
            id: Id::new(),
            owner: Owner::Project(project_id),
            ..self.clone()
        }
    }
}

/// Entity a [`Document`] is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Owner {
    /// [`Lead`] the [`Document`] was uploaded for.
    ///
    /// [`Lead`]: super::Lead
    Lead(lead::Id),

    /// [`Project`] the [`Document`] was copied to at conversion.
    ///
    /// [`Project`]: super::Project
    Project(project::Id),
}

/// ID of a [`Document`].
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

/// Original file name of a [`Document`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct FileName(String);

impl FromStr for FileName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (!s.trim().is_empty() && s.len() <= 255)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `FileName`")
    }
}

/// Opaque storage reference of a [`Document`]'s contents.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct StorageKey(String);

/// Declared MIME type of a [`Document`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct ContentType(String);

impl FromStr for ContentType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (s.contains('/') && s.len() <= 255)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `ContentType`")
    }
}

/// [`DateTime`] when a [`Document`] was uploaded.
pub type UploadDateTime = DateTimeOf<(Document, unit::Upload)>;
