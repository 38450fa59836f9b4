//! [`Command`] for updating an existing [`Lead`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted,
                 Update},
    DateTime, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{activity, lead, score, score_history, user, Lead, User},
    infra::{database, email, Database, Mailer},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Lead`].
///
/// Absent fields are left untouched. Rescores the [`Lead`] and appends a
/// score history record when the score changes. [`Won`] is never
/// reachable through an update, and leads already in a terminal status
/// reject any further status transition.
///
/// [`Won`]: lead::Status::Won
#[derive(Clone, Debug, Default)]
pub struct UpdateLead {
    /// ID of the [`Lead`] to update.
    pub id: lead::Id,

    /// New [`Status`] of the [`Lead`].
    ///
    /// [`Status`]: lead::Status
    pub status: Option<lead::Status>,

    /// New name of the enquiring customer.
    pub name: Option<lead::Name>,

    /// New email address of the enquiring customer.
    pub email: Option<lead::Email>,

    /// New phone number of the enquiring customer.
    pub phone: Option<lead::Phone>,

    /// New WhatsApp number of the enquiring customer.
    pub whatsapp: Option<lead::Phone>,

    /// New type of the enquiring customer.
    pub customer_type: Option<lead::CustomerType>,

    /// New type of the enquired project.
    pub project_type: Option<lead::ProjectType>,

    /// New source of the [`Lead`].
    pub source: Option<lead::Source>,

    /// New priority of the [`Lead`].
    pub priority: Option<lead::Priority>,

    /// New declared budget of the enquiry.
    pub budget: Option<Money>,

    /// New built-up area of the enquired project, in square feet.
    pub sqft_area: Option<lead::Area>,

    /// New plot area of the enquired project, in square feet.
    pub plot_area: Option<lead::Area>,

    /// New number of floors of the enquired project.
    pub floors: Option<lead::Floors>,

    /// New free-text description of the enquired project.
    pub description: Option<lead::Text>,

    /// New free-text customer requirements.
    pub requirements: Option<lead::Text>,

    /// New free-text notes of the sales team.
    pub notes: Option<lead::Text>,

    /// Reason the [`Lead`] was lost.
    pub lost_reason: Option<lead::Text>,

    /// New state the enquired project is located in.
    pub state: Option<lead::State>,

    /// New district the enquired project is located in.
    pub district: Option<lead::District>,

    /// New location of the enquired project.
    pub location: Option<lead::Location>,

    /// New full address of the enquired project.
    pub address: Option<lead::Address>,

    /// New star rating given to the customer.
    pub client_rating: Option<lead::Rating>,

    /// New estimated probability to win the [`Lead`].
    pub probability_to_win: Option<Percent>,

    /// ID of the [`User`] to reassign the [`Lead`] to.
    pub assigned_to: Option<user::Id>,

    /// New date of the enquiry.
    pub date_of_enquiry: Option<lead::EnquiryDate>,

    /// [`DateTime`] of the last contact with the customer.
    pub last_contact_at: Option<lead::ContactDateTime>,

    /// [`DateTime`] of the next scheduled follow-up.
    pub next_follow_up_at: Option<lead::FollowUpDateTime>,

    /// [`User`] performing the update.
    pub actor: Option<user::Id>,
}

impl<Db, M> Command<UpdateLead> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<activity::Record>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Lead, lead::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Lead>, lead::Id>>,
            Ok = Option<Lead>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<score_history::Record>,
            Err = Traced<database::Error>,
        > + Database<Update<Lead>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    M: Mailer<email::StatusChange, Err = Traced<email::Error>>
        + Mailer<email::HotLeadAlert, Err = Traced<email::Error>>,
{
    type Ok = Lead;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: UpdateLead) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Lead`.
        tx.execute(Lock(By::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut lead = tx
            .execute(Select(By::<Option<Lead>, _>::new(cmd.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LeadNotExists(cmd.id))
            .map_err(tracerr::wrap!())?;

        let previous_status = lead.status;
        let previous_category = lead.score_category;
        let previous_assignee = lead.assigned_to;

        if let Some(to) = cmd.status {
            if to != lead.status {
                if lead.status.is_terminal() {
                    return Err(tracerr::new!(E::LeadClosed {
                        id: lead.id,
                        status: lead.status,
                    }));
                }
                if to == lead::Status::Won {
                    return Err(tracerr::new!(E::WonOnlyViaConversion(
                        lead.id
                    )));
                }
                lead.status = to;
            }
        }

        if let Some(user_id) = cmd.assigned_to {
            if previous_assignee != Some(user_id) {
                let assignee = tx
                    .execute(Select(By::<Option<User>, _>::new(user_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::UserNotExists(user_id))
                    .map_err(tracerr::wrap!())?;
                lead.assigned_to = Some(assignee.id);
                lead.assigned_team =
                    lead::Team::new(assignee.name.to_string());
            }
        }

        let UpdateLead {
            name,
            email,
            phone,
            whatsapp,
            customer_type,
            project_type,
            source,
            priority,
            budget,
            sqft_area,
            plot_area,
            floors,
            description,
            requirements,
            notes,
            lost_reason,
            state,
            district,
            location,
            address,
            client_rating,
            probability_to_win,
            date_of_enquiry,
            last_contact_at,
            next_follow_up_at,
            actor,
            ..
        } = cmd;
        apply(&mut lead.name, name);
        apply_opt(&mut lead.email, email);
        apply_opt(&mut lead.phone, phone);
        apply_opt(&mut lead.whatsapp, whatsapp);
        apply_opt(&mut lead.customer_type, customer_type);
        apply_opt(&mut lead.project_type, project_type);
        apply_opt(&mut lead.source, source);
        apply(&mut lead.priority, priority);
        apply_opt(&mut lead.budget, budget);
        apply_opt(&mut lead.sqft_area, sqft_area);
        apply_opt(&mut lead.plot_area, plot_area);
        apply_opt(&mut lead.floors, floors);
        apply_opt(&mut lead.description, description);
        apply_opt(&mut lead.requirements, requirements);
        apply_opt(&mut lead.notes, notes);
        apply_opt(&mut lead.lost_reason, lost_reason);
        apply_opt(&mut lead.state, state);
        apply_opt(&mut lead.district, district);
        apply_opt(&mut lead.location, location);
        apply_opt(&mut lead.address, address);
        apply_opt(&mut lead.client_rating, client_rating);
        apply_opt(&mut lead.probability_to_win, probability_to_win);
        apply(&mut lead.date_of_enquiry, date_of_enquiry);
        apply_opt(&mut lead.last_contact_at, last_contact_at);
        apply_opt(&mut lead.next_follow_up_at, next_follow_up_at);

        let now = DateTime::now();
        let previous_score = lead.score;
        let (outcome, score_changed) = lead.rescore(now.coerce());
        if score_changed {
            let record = score_history::Record {
                id: score_history::Id::new(),
                lead_id: lead.id,
                previous_score,
                new_score: outcome.score,
                previous_category,
                new_category: outcome.category,
                factors: outcome.factors,
                reason: None,
                scored_by: actor,
                scored_at: now.coerce(),
            };
            // Score history is advisory and must never fail the update.
            if let Err(e) = tx.execute(Insert(record)).await {
                tracing::warn!("failed to append score history: {e}");
            }
        }

        lead.updated_at = Some(now.coerce());
        tx.execute(Update(lead.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if lead.status == previous_status {
            self.record_activity(activity::Record {
                id: activity::Id::new(),
                lead_id: lead.id,
                project_id: None,
                kind: activity::Kind::LeadUpdated,
                title: format!("Lead updated: {}", lead.name).into(),
                description: None,
                actor,
                occurred_at: now.coerce(),
            })
            .await;
        } else {
            self.record_activity(activity::Record {
                id: activity::Id::new(),
                lead_id: lead.id,
                project_id: None,
                kind: activity::Kind::StatusChanged,
                title: format!(
                    "Status changed: {previous_status} -> {}",
                    lead.status,
                )
                .into(),
                description: None,
                actor,
                occurred_at: now.coerce(),
            })
            .await;
            if let Some(to) = lead.email.clone() {
                let mail = email::StatusChange {
                    to,
                    name: lead.name.clone(),
                    from: previous_status,
                    into: lead.status,
                };
                if let Err(e) = self.mailer().execute(mail).await {
                    tracing::warn!(
                        "failed to send status change notification: {e}",
                    );
                }
            }
        }
        if lead.assigned_to != previous_assignee {
            if let Some(assignee_id) = lead.assigned_to {
                self.record_activity(activity::Record {
                    id: activity::Id::new(),
                    lead_id: lead.id,
                    project_id: None,
                    kind: activity::Kind::LeadAssigned,
                    title: format!("Lead assigned to user {assignee_id}")
                        .into(),
                    description: None,
                    actor,
                    occurred_at: now.coerce(),
                })
                .await;
            }
        }
        if lead.score_category == score::Category::Hot
            && previous_category != score::Category::Hot
        {
            let alert = email::HotLeadAlert {
                lead_id: lead.id,
                name: lead.name.clone(),
                score: lead.score,
            };
            if let Err(e) = self.mailer().execute(alert).await {
                tracing::warn!("failed to send hot lead alert: {e}");
            }
        }

        Ok(lead)
    }
}

/// Replaces `field` with the given `value`, if any.
fn apply<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

/// Replaces an optional `field` with the given `value`, if any.
///
/// Absent values keep the current one, so fields cannot be cleared
/// through an update, only replaced.
fn apply_opt<T>(field: &mut Option<T>, value: Option<T>) {
    if let Some(v) = value {
        *field = Some(v);
    }
}

/// Error of [`UpdateLead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lead`] is already in a terminal status.
    #[display("`Lead(id: {id})` is closed as `{status}`")]
    LeadClosed {
        /// ID of the closed [`Lead`].
        id: lead::Id,

        /// Terminal status the [`Lead`] is in.
        status: lead::Status,
    },

    /// [`Lead`] with the provided ID does not exist.
    #[display("`Lead(id: {_0})` does not exist")]
    LeadNotExists(#[error(not(source))] lead::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Won`] is only reachable through a conversion.
    ///
    /// [`Won`]: lead::Status::Won
    #[display("`Lead(id: {_0})` cannot be marked `WON` via an update")]
    WonOnlyViaConversion(#[error(not(source))] lead::Id),
}
