//! [`Command`] for deleting a drafted [`Quotation`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{quotation, Quotation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Quotation`] that is still a [`Draft`].
///
/// Anything already sent out stays on record permanently.
///
/// [`Draft`]: quotation::Status::Draft
#[derive(Clone, Copy, Debug)]
pub struct DeleteQuotation {
    /// ID of the [`Quotation`] to delete.
    pub id: quotation::Id,
}

impl<Db, M> Command<DeleteQuotation> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Quotation, quotation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quotation>, quotation::Id>>,
            Ok = Option<Quotation>,
            Err = Traced<database::Error>,
        > + Database<Delete<quotation::Id>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteQuotation,
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

        let quotation = tx
            .execute(Select(By::<Option<Quotation>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuotationNotExists(cmd.id))
            .map_err(tracerr::wrap!())?;
        if quotation.status != quotation::Status::Draft {
            return Err(tracerr::new!(E::NotDraft {
                id: cmd.id,
                status: quotation.status,
            }));
        }

        tx.execute(Delete(quotation.id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteQuotation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Quotation`] is not a draft anymore.
    #[display("`Quotation(id: {id})` is `{status}`, not a draft")]
    NotDraft {
        /// ID of the [`Quotation`].
        id: quotation::Id,

        /// Status the [`Quotation`] is in.
        status: quotation::Status,
    },

    /// [`Quotation`] with the provided ID does not exist.
    #[display("`Quotation(id: {_0})` does not exist")]
    QuotationNotExists(#[error(not(source))] quotation::Id),
}
