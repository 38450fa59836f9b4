//! [`Mailer`]-related definitions.

use derive_more::{Display, Error as StdError, From};
use secrecy::SecretBox;

use crate::domain::{customer, lead, score};

/// Outbound email operation.
///
/// Every send is best-effort: callers log and swallow failures instead of
/// failing the action that triggered the mail.
pub use common::Handler as Mailer;

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Mail could not be handed over for delivery.
    #[display("send error: {_0}")]
    Send(#[error(not(source))] String),
}

/// Welcome mail sent to a freshly created [`Customer`], carrying the
/// generated temporary portal password.
///
/// [`Customer`]: crate::domain::Customer
#[derive(Debug)]
pub struct Welcome {
    /// Address the mail is sent to.
    pub to: lead::Email,

    /// Name the mail addresses the recipient by.
    pub name: lead::Name,

    /// Generated temporary portal password.
    pub password: SecretBox<customer::Password>,
}

/// Notification about a lead's status change, sent to the lead's contact
/// address.
#[derive(Clone, Debug)]
pub struct StatusChange {
    /// Address the mail is sent to.
    pub to: lead::Email,

    /// Name the mail addresses the recipient by.
    pub name: lead::Name,

    /// Status the lead moved from.
    pub from: lead::Status,

    /// Status the lead moved to.
    pub into: lead::Status,
}

/// Internal alert about a lead becoming [`Hot`], sent to the assigned
/// sales user.
///
/// [`Hot`]: score::Category::Hot
#[derive(Clone, Debug)]
pub struct HotLeadAlert {
    /// ID of the lead that became hot.
    pub lead_id: lead::Id,

    /// Name of the lead that became hot.
    pub name: lead::Name,

    /// Score that crossed the hot threshold.
    pub score: score::Score,
}
