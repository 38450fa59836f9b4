//! [`Command`] for recording the first view of a sent [`Quotation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{quotation, Quotation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording that a sent [`Quotation`] was viewed by the
/// customer.
///
/// Idempotent: a [`Quotation`] already carrying a view timestamp is
/// returned unchanged, keeping its original timestamp.
#[derive(Clone, Copy, Debug)]
pub struct MarkQuotationViewed {
    /// ID of the [`Quotation`] that was viewed.
    pub id: quotation::Id,
}

impl<Db, M> Command<MarkQuotationViewed> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
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
        cmd: MarkQuotationViewed,
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

        if quotation.viewed_at.is_some() {
            return Ok(quotation);
        }
        if quotation.status != quotation::Status::Sent {
            return Err(tracerr::new!(E::NotSent {
                id: cmd.id,
                status: quotation.status,
            }));
        }

        let now = DateTime::now();
        quotation.status = quotation::Status::Viewed;
        quotation.viewed_at = Some(now.coerce());
        quotation.updated_at = Some(now.coerce());

        tx.execute(Update(quotation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(quotation)
    }
}

/// Error of [`MarkQuotationViewed`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Quotation`] was never sent out.
    #[display("`Quotation(id: {id})` is `{status}`, not sent")]
    NotSent {
        /// ID of the [`Quotation`].
        id: quotation::Id,

        /// Status the [`Quotation`] is in.
        status: quotation::Status,
    },

    /// [`Quotation`] with the provided ID does not exist.
    #[display("`Quotation(id: {_0})` does not exist")]
    QuotationNotExists(#[error(not(source))] quotation::Id),
}
