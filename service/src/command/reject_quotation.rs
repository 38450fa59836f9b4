//! [`Command`] for rejecting a sent [`Quotation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted,
                 Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, lead, quotation, user, Quotation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting a sent [`Quotation`] on the customer's
/// behalf.
///
/// An optional reason is appended to the [`Quotation`]'s notes for the
/// sales team.
#[derive(Clone, Debug)]
pub struct RejectQuotation {
    /// ID of the [`Quotation`] to reject.
    pub id: quotation::Id,

    /// Free-text reason of the rejection.
    pub reason: Option<lead::Text>,

    /// [`User`] recording the rejection.
    ///
    /// [`User`]: crate::domain::User
    pub actor: Option<user::Id>,
}

impl<Db, M> Command<RejectQuotation> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<activity::Record>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Quotation, quotation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quotation>, quotation::Id>>,
            Ok = Option<Quotation>,
            Err = Traced<database::Error>,
        > + Database<Update<Quotation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Quotation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RejectQuotation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectQuotation { id, reason, actor } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut quotation = tx
            .execute(Select(By::<Option<Quotation>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuotationNotExists(id))
            .map_err(tracerr::wrap!())?;
        if !quotation.status.accepts_response() {
            return Err(tracerr::new!(E::NotRespondable {
                id,
                status: quotation.status,
            }));
        }

        let now = DateTime::now();
        quotation.status = quotation::Status::Rejected;
        quotation.responded_at = Some(now.coerce());
        quotation.updated_at = Some(now.coerce());
        if let Some(reason) = &reason {
            let notes = match &quotation.notes {
                Some(notes) => {
                    format!("{notes}\nRejection reason: {reason}")
                }
                None => format!("Rejection reason: {reason}"),
            };
            // Overlong appendage keeps the original notes untouched.
            if let Some(appended) = lead::Text::new(notes) {
                quotation.notes = Some(appended);
            }
        }

        tx.execute(Update(quotation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.record_activity(activity::Record {
            id: activity::Id::new(),
            lead_id: quotation.lead_id,
            project_id: None,
            kind: activity::Kind::QuotationResponded,
            title: format!("Quotation {} rejected", quotation.number).into(),
            description: reason,
            actor,
            occurred_at: now.coerce(),
        })
        .await;

        Ok(quotation)
    }
}

/// Error of [`RejectQuotation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Quotation`] cannot receive a response in its current status.
    #[display("`Quotation(id: {id})` is `{status}` and cannot be responded")]
    NotRespondable {
        /// ID of the [`Quotation`].
        id: quotation::Id,

        /// Status the [`Quotation`] is in.
        status: quotation::Status,
    },

    /// [`Quotation`] with the provided ID does not exist.
    #[display("`Quotation(id: {_0})` does not exist")]
    QuotationNotExists(#[error(not(source))] quotation::Id),
}
