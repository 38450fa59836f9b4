//! [`Command`] for accepting a sent [`Quotation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted,
                 Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, quotation, user, Quotation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for accepting a sent [`Quotation`] on the customer's
/// behalf.
///
/// Acceptance is allowed straight from [`Sent`]: viewing first is not
/// mandatory.
///
/// [`Sent`]: quotation::Status::Sent
#[derive(Clone, Copy, Debug)]
pub struct AcceptQuotation {
    /// ID of the [`Quotation`] to accept.
    pub id: quotation::Id,

    /// [`User`] recording the acceptance.
    ///
    /// [`User`]: crate::domain::User
    pub actor: Option<user::Id>,
}

impl<Db, M> Command<AcceptQuotation> for Service<Db, M>
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
        cmd: AcceptQuotation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut quotation = tx
            .execute(Select(By::<Option<Quotation>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuotationNotExists(cmd.id))
            .map_err(tracerr::wrap!())?;
        if !quotation.status.accepts_response() {
            return Err(tracerr::new!(E::NotRespondable {
                id: cmd.id,
                status: quotation.status,
            }));
        }

        let now = DateTime::now();
        quotation.status = quotation::Status::Accepted;
        quotation.responded_at = Some(now.coerce());
        quotation.updated_at = Some(now.coerce());

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
            title: format!("Quotation {} accepted", quotation.number).into(),
            description: None,
            actor: cmd.actor,
            occurred_at: now.coerce(),
        })
        .await;

        Ok(quotation)
    }
}

/// Error of [`AcceptQuotation`] [`Command`] execution.
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
