//! [`Command`] for drafting a new [`Quotation`].

use common::{
    operations::{By, Commit, Increment, Insert, Select, Transact,
                 Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, lead, quotation, user, Lead, Quotation},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for drafting a new [`Quotation`] for a [`Lead`].
///
/// Acquires a collision-free quotation number from the numbering
/// sequence, versions the [`Quotation`] after the lead's latest one, and
/// recomputes the amounts from the items when any are provided.
#[derive(Clone, Debug)]
pub struct CreateQuotation {
    /// ID of the [`Lead`] the new [`Quotation`] is prepared for.
    pub lead_id: lead::Id,

    /// Title of the new [`Quotation`].
    pub title: quotation::Title,

    /// Free-text description of the new [`Quotation`].
    pub description: Option<lead::Text>,

    /// Line items of the new [`Quotation`].
    pub items: Vec<NewItem>,

    /// Total amount, used only when no items are provided.
    pub total_amount: Option<Money>,

    /// Tax added on top of the total.
    pub tax_amount: Option<Money>,

    /// Discount subtracted from the total.
    pub discount_amount: Option<Money>,

    /// Number of days the new [`Quotation`] stays valid, defaulting to
    /// the configured value.
    pub validity_days: Option<quotation::ValidityDays>,

    /// Free-text notes of the new [`Quotation`].
    pub notes: Option<lead::Text>,

    /// [`User`] drafting the new [`Quotation`].
    ///
    /// [`User`]: crate::domain::User
    pub created_by: Option<user::Id>,
}

/// Line item of a [`CreateQuotation`] or an [`UpdateQuotation`]
/// [`Command`].
///
/// [`UpdateQuotation`]: super::UpdateQuotation
#[derive(Clone, Debug)]
pub struct NewItem {
    /// Free-text description of the quoted work or material.
    pub description: lead::Text,

    /// Quoted quantity.
    pub quantity: quotation::Quantity,

    /// Price per unit.
    pub unit_price: Money,
}

impl NewItem {
    /// Builds a [`quotation::Item`] out of this [`NewItem`], deriving its
    /// total price.
    pub(crate) fn build(
        self,
    ) -> Result<quotation::Item, quotation::AmountOverflow> {
        quotation::Item::new(self.description, self.quantity, self.unit_price)
    }
}

impl<Db, M> Command<CreateQuotation> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<activity::Record>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Lead>, lead::Id>>,
            Ok = Option<Lead>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::quotation::NextVersion, lead::Id>>,
            Ok = read::quotation::NextVersion,
            Err = Traced<database::Error>,
        > + Database<
            Increment<quotation::Sequence>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Insert<Quotation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Quotation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateQuotation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateQuotation {
            lead_id,
            title,
            description,
            items,
            total_amount,
            tax_amount,
            discount_amount,
            validity_days,
            notes,
            created_by,
        } = cmd;

        let items = items
            .into_iter()
            .map(NewItem::build)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| tracerr::new!(E::from(e)))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Select(By::<Option<Lead>, _>::new(lead_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LeadNotExists(lead_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let sequence = tx
            .execute(Increment(quotation::Sequence))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let read::quotation::NextVersion(version) = tx
            .execute(Select(
                By::<read::quotation::NextVersion, _>::new(lead_id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let mut quotation = Quotation {
            id: quotation::Id::new(),
            lead_id,
            number: quotation::Number::generate(now.date(), sequence),
            version,
            title,
            description,
            status: quotation::Status::Draft,
            total_amount: total_amount.unwrap_or(Money::ZERO),
            tax_amount,
            discount_amount,
            final_amount: Money::ZERO,
            validity_days: validity_days.unwrap_or_else(|| {
                self.config().quotation_validity_days.into()
            }),
            notes,
            created_by,
            created_at: now.coerce(),
            updated_at: None,
            sent_at: None,
            viewed_at: None,
            responded_at: None,
            items,
        };
        quotation
            .recompute_amounts()
            .map_err(|e| tracerr::new!(E::from(e)))?;

        tx.execute(Insert(quotation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.record_activity(activity::Record {
            id: activity::Id::new(),
            lead_id,
            project_id: None,
            kind: activity::Kind::QuotationCreated,
            title: format!("Quotation {} drafted", quotation.number).into(),
            description: None,
            actor: created_by,
            occurred_at: now.coerce(),
        })
        .await;

        Ok(quotation)
    }
}

/// Error of [`CreateQuotation`] [`Command`] execution.
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

    /// [`Lead`] with the provided ID does not exist.
    #[display("`Lead(id: {_0})` does not exist")]
    LeadNotExists(#[error(not(source))] lead::Id),
}
