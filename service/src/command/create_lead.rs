//! [`Command`] for registering a new [`Lead`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
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

/// [`Command`] for registering a new [`Lead`].
///
/// Defaults the date of enquiry to today and the status to
/// [`NewInquiry`], scores the new [`Lead`] and appends the baseline score
/// history when the initial score is non-zero.
///
/// [`NewInquiry`]: lead::Status::NewInquiry
#[derive(Clone, Debug)]
pub struct CreateLead {
    /// [`Name`] of the enquiring customer.
    ///
    /// [`Name`]: lead::Name
    pub name: lead::Name,

    /// Email address of the enquiring customer.
    pub email: Option<lead::Email>,

    /// Phone number of the enquiring customer.
    pub phone: Option<lead::Phone>,

    /// WhatsApp number of the enquiring customer.
    pub whatsapp: Option<lead::Phone>,

    /// Type of the enquiring customer.
    pub customer_type: Option<lead::CustomerType>,

    /// Type of the enquired project.
    pub project_type: Option<lead::ProjectType>,

    /// Source the new [`Lead`] came from.
    pub source: Option<lead::Source>,

    /// [`Priority`] of the new [`Lead`].
    ///
    /// [`Priority`]: lead::Priority
    pub priority: Option<lead::Priority>,

    /// Declared budget of the enquiry.
    pub budget: Option<Money>,

    /// Built-up area of the enquired project, in square feet.
    pub sqft_area: Option<lead::Area>,

    /// Plot area of the enquired project, in square feet.
    pub plot_area: Option<lead::Area>,

    /// Number of floors of the enquired project.
    pub floors: Option<lead::Floors>,

    /// Free-text description of the enquired project.
    pub description: Option<lead::Text>,

    /// Free-text customer requirements.
    pub requirements: Option<lead::Text>,

    /// Free-text notes of the sales team.
    pub notes: Option<lead::Text>,

    /// State the enquired project is located in.
    pub state: Option<lead::State>,

    /// District the enquired project is located in.
    pub district: Option<lead::District>,

    /// Location of the enquired project.
    pub location: Option<lead::Location>,

    /// Full address of the enquired project.
    pub address: Option<lead::Address>,

    /// Star rating given to the customer by the sales team.
    pub client_rating: Option<lead::Rating>,

    /// Estimated probability to win the new [`Lead`].
    pub probability_to_win: Option<Percent>,

    /// ID of the [`User`] to assign the new [`Lead`] to.
    pub assigned_to: Option<user::Id>,

    /// Calendar date of the enquiry, defaulting to today.
    pub date_of_enquiry: Option<lead::EnquiryDate>,

    /// [`DateTime`] of the next scheduled follow-up.
    pub next_follow_up_at: Option<lead::FollowUpDateTime>,
}

impl<Db, M> Command<CreateLead> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<activity::Record>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Lead>, Err = Traced<database::Error>>
        + Database<
            Insert<score_history::Record>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
    M: Mailer<email::HotLeadAlert, Err = Traced<email::Error>>,
{
    type Ok = Lead;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: CreateLead) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLead {
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
            state,
            district,
            location,
            address,
            client_rating,
            probability_to_win,
            assigned_to,
            date_of_enquiry,
            next_follow_up_at,
        } = cmd;

        let assignee = match assigned_to {
            Some(user_id) => Some(
                self.database()
                    .execute(Select(By::<Option<User>, _>::new(user_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::UserNotExists(user_id))
                    .map_err(tracerr::wrap!())?,
            ),
            None => None,
        };
        let assigned_team = assignee
            .as_ref()
            .and_then(|u| lead::Team::new(u.name.to_string()));

        let now = DateTime::now();
        let mut lead = Lead {
            id: lead::Id::new(),
            name,
            email,
            phone,
            whatsapp,
            customer_type,
            project_type,
            source,
            priority: priority.unwrap_or_default(),
            status: lead::Status::NewInquiry,
            budget,
            sqft_area,
            plot_area,
            floors,
            description,
            requirements,
            notes,
            lost_reason: None,
            state,
            district,
            location,
            address,
            client_rating,
            probability_to_win,
            score: score::Score::default(),
            score_category: score::Category::default(),
            score_factors: score::Factors::default(),
            assigned_to: assignee.as_ref().map(|u| u.id),
            assigned_team,
            date_of_enquiry: date_of_enquiry
                .unwrap_or_else(lead::EnquiryDate::today),
            last_contact_at: None,
            next_follow_up_at,
            last_scored_at: None,
            created_at: now.coerce(),
            updated_at: None,
            converted_at: None,
            converted_by: None,
        };
        let (outcome, score_changed) = lead.rescore(now.coerce());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(lead.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if score_changed {
            let baseline = score_history::Record {
                id: score_history::Id::new(),
                lead_id: lead.id,
                previous_score: score::Score::default(),
                new_score: outcome.score,
                previous_category: score::Category::default(),
                new_category: outcome.category,
                factors: outcome.factors,
                reason: None,
                scored_by: None,
                scored_at: now.coerce(),
            };
            // Score history is advisory and must never fail the intake.
            if let Err(e) = tx.execute(Insert(baseline)).await {
                tracing::warn!("failed to append score history: {e}");
            }
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.record_activity(activity::Record {
            id: activity::Id::new(),
            lead_id: lead.id,
            project_id: None,
            kind: activity::Kind::LeadCreated,
            title: format!("Lead created: {}", lead.name).into(),
            description: None,
            actor: None,
            occurred_at: now.coerce(),
        })
        .await;
        if let Some(assignee_id) = lead.assigned_to {
            self.record_activity(activity::Record {
                id: activity::Id::new(),
                lead_id: lead.id,
                project_id: None,
                kind: activity::Kind::LeadAssigned,
                title: format!("Lead assigned to user {assignee_id}").into(),
                description: None,
                actor: None,
                occurred_at: now.coerce(),
            })
            .await;
        }

        if lead.score_category == score::Category::Hot {
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

/// Error of [`CreateLead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
