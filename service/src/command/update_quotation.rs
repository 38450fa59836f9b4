//! [`Command`] for updating a drafted or sent [`Quotation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lead, quotation, Quotation},
    infra::{database, Database},
    Service,
};

use super::{create_quotation::NewItem, Command};

/// [`Command`] for updating an existing [`Quotation`].
///
/// Absent fields are left untouched. Replacing the items recomputes the
/// amounts. [`Quotation`]s already responded to (accepted or rejected)
/// reject any mutation.
#[derive(Clone, Debug)]
pub struct UpdateQuotation {
    /// ID of the [`Quotation`] to update.
    pub id: quotation::Id,

    /// New title of the [`Quotation`].
    pub title: Option<quotation::Title>,

    /// New free-text description of the [`Quotation`].
    pub description: Option<lead::Text>,

    /// Replacement line items of the [`Quotation`].
    pub items: Option<Vec<NewItem>>,

    /// New total amount, effective only while there are no items.
    pub total_amount: Option<Money>,

    /// New tax amount.
    pub tax_amount: Option<Money>,

    /// New discount amount.
    pub discount_amount: Option<Money>,

    /// New number of validity days.
    pub validity_days: Option<quotation::ValidityDays>,

    /// New free-text notes of the [`Quotation`].
    pub notes: Option<lead::Text>,
}

impl<Db, M> Command<UpdateQuotation> for Service<Db, M>
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
        cmd: UpdateQuotation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateQuotation {
            id,
            title,
            description,
            items,
            total_amount,
            tax_amount,
            discount_amount,
            validity_days,
            notes,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Quotation`.
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
        if quotation.status.is_terminal() {
            return Err(tracerr::new!(E::QuotationClosed {
                id,
                status: quotation.status,
            }));
        }

        if let Some(title) = title {
            quotation.title = title;
        }
        if let Some(description) = description {
            quotation.description = Some(description);
        }
        if let Some(items) = items {
            quotation.items = items
                .into_iter()
                .map(NewItem::build)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| tracerr::new!(E::from(e)))?;
        }
        if let Some(total) = total_amount {
            quotation.total_amount = total;
        }
        if let Some(tax) = tax_amount {
            quotation.tax_amount = Some(tax);
        }
        if let Some(discount) = discount_amount {
            quotation.discount_amount = Some(discount);
        }
        if let Some(days) = validity_days {
            quotation.validity_days = days;
        }
        if let Some(notes) = notes {
            quotation.notes = Some(notes);
        }

        quotation
            .recompute_amounts()
            .map_err(|e| tracerr::new!(E::from(e)))?;
        quotation.updated_at = Some(DateTime::now().coerce());

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

/// Error of [`UpdateQuotation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Quotation`] amounts exceed the representable range.
    #[display("{_0}")]
    #[from]
    AmountOverflow(quotation::AmountOverflow),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Quotation`] was already responded to.
    #[display("`Quotation(id: {id})` is closed as `{status}`")]
    QuotationClosed {
        /// ID of the closed [`Quotation`].
        id: quotation::Id,

        /// Terminal status the [`Quotation`] is in.
        status: quotation::Status,
    },

    /// [`Quotation`] with the provided ID does not exist.
    #[display("`Quotation(id: {_0})` does not exist")]
    QuotationNotExists(#[error(not(source))] quotation::Id),
}
