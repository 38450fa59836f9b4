//! [`Command`] definition.

pub mod accept_quotation;
pub mod convert_lead;
pub mod create_lead;
pub mod create_quotation;
pub mod delete_quotation;
pub mod mark_quotation_viewed;
pub mod reject_quotation;
pub mod send_quotation;
pub mod update_lead;
pub mod update_quotation;

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::activity,
    infra::{database, Database},
    Service,
};

/// [`Command`] of the [`Service`].
pub use common::Handler as Command;

impl<Db, M> Service<Db, M>
where
    Db: Database<Insert<activity::Record>, Err = Traced<database::Error>>,
{
    /// Appends the given [`activity::Record`] best-effort, logging and
    /// swallowing any failure: the activity log never blocks the action
    /// that produced the entry.
    pub(crate) async fn record_activity(&self, record: activity::Record) {
        if let Err(e) = self.database().execute(Insert(record)).await {
            tracing::warn!("failed to record activity: {e}");
        }
    }
}

pub use self::{
    accept_quotation::AcceptQuotation, convert_lead::ConvertLead,
    create_lead::CreateLead,
    create_quotation::{CreateQuotation, NewItem},
    delete_quotation::DeleteQuotation,
    mark_quotation_viewed::MarkQuotationViewed,
    reject_quotation::RejectQuotation, send_quotation::SendQuotation,
    update_lead::UpdateLead, update_quotation::UpdateQuotation,
};
