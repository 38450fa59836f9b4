//! [`Command`] for converting a [`Lead`] into a [`Customer`] and a
//! [`Project`].

use common::{
    operations::{By, Commit, Increment, Insert, Lock, Select, Transact,
                 Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{
        activity, boq, customer, lead, project, quotation, user, Customer,
        Document, Lead, Project, Quotation, User,
    },
    infra::{database, email, Database, Mailer},
    read,
    Service,
};

use super::Command;

/// [`Command`] for converting a [`Lead`] into a [`Customer`] and a
/// [`Project`], with the accepted [`Quotation`] migrated into
/// bill-of-quantities lines.
///
/// The whole conversion executes as one unit of work: a failure at any
/// step leaves no partial state behind. Returns the created [`Project`].
#[derive(Clone, Copy, Debug)]
pub struct ConvertLead {
    /// ID of the [`Lead`] to convert.
    pub lead_id: lead::Id,

    /// [`Quotation`] to consume: its final amount becomes the project
    /// budget and its items seed the bill of quantities.
    pub quotation_id: Option<quotation::Id>,

    /// [`User`] to install as the project manager.
    pub project_manager: Option<user::Id>,

    /// Start date of the new [`Project`], defaulting to today.
    pub start_date: Option<project::StartDate>,

    /// [`User`] performing the conversion.
    pub actor: Option<user::Id>,
}

impl<Db, M> Command<ConvertLead> for Service<Db, M>
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
            Select<By<read::project::ExistsForLead, lead::Id>>,
            Ok = read::project::ExistsForLead,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quotation>, quotation::Id>>,
            Ok = Option<Quotation>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, lead::Email>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Document>, lead::Id>>,
            Ok = Vec<Document>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<activity::Record>, lead::Id>>,
            Ok = Vec<activity::Record>,
            Err = Traced<database::Error>,
        > + Database<
            Increment<project::Sequence>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Insert<Customer>, Err = Traced<database::Error>>
        + Database<Insert<Project>, Err = Traced<database::Error>>
        + Database<Insert<project::Member>, Err = Traced<database::Error>>
        + Database<Insert<boq::Item>, Err = Traced<database::Error>>
        + Database<Insert<Document>, Err = Traced<database::Error>>
        + Database<Update<Quotation>, Err = Traced<database::Error>>
        + Database<Update<activity::Record>, Err = Traced<database::Error>>
        + Database<Update<Lead>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    M: Mailer<email::Welcome, Err = Traced<email::Error>>,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "saga spans many entities")]
    async fn execute(&self, cmd: ConvertLead) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConvertLead {
            lead_id,
            quotation_id,
            project_manager,
            start_date,
            actor,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent conversion attempts for the same `Lead`:
        // the loser blocks here and then trips a precondition below.
        tx.execute(Lock(By::new(lead_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut lead = tx
            .execute(Select(By::<Option<Lead>, _>::new(lead_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LeadNotExists(lead_id))
            .map_err(tracerr::wrap!())?;
        if lead.status == lead::Status::Won {
            return Err(tracerr::new!(E::AlreadyConverted(lead_id)));
        }
        if lead.status == lead::Status::Lost {
            return Err(tracerr::new!(E::LeadLost(lead_id)));
        }

        let project_exists = tx
            .execute(Select(
                By::<read::project::ExistsForLead, _>::new(lead_id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *project_exists {
            return Err(tracerr::new!(E::AlreadyConverted(lead_id)));
        }

        let mut quotation = match quotation_id {
            Some(id) => {
                let q = tx
                    .execute(Select(By::<Option<Quotation>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::QuotationNotExists(id))
                    .map_err(tracerr::wrap!())?;
                if q.lead_id != lead_id {
                    return Err(tracerr::new!(E::QuotationNotOfLead {
                        quotation: id,
                        lead: lead_id,
                    }));
                }
                Some(q)
            }
            None => None,
        };

        let email = lead
            .email
            .clone()
            .ok_or(E::LeadWithoutEmail(lead_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();

        // Step 1: resolve the customer by email, creating one if absent.
        let existing_customer = tx
            .execute(Select(By::<Option<Customer>, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut welcome = None;
        let customer = match existing_customer {
            Some(c) => c,
            None => {
                let password =
                    SecretBox::new(Box::new(customer::Password::generate()));
                let (first_name, last_name) = customer::split_name(&lead.name);
                let c = Customer {
                    id: customer::Id::new(),
                    first_name,
                    last_name,
                    email: email.clone(),
                    phone: lead.phone.clone(),
                    whatsapp: lead.whatsapp.clone(),
                    address: lead.address.clone(),
                    state: lead.state.clone(),
                    district: lead.district.clone(),
                    source: lead.source.clone(),
                    notes: lead.notes.clone(),
                    password_hash: customer::PasswordHash::new(
                        password.expose_secret(),
                    ),
                    lead_id,
                    created_at: now.coerce(),
                };
                tx.execute(Insert(c.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                welcome = Some(email::Welcome {
                    to: email.clone(),
                    name: lead.name.clone(),
                    password,
                });
                c
            }
        };

        // Step 2: the quotation's final amount wins over the raw budget.
        let budget = match &mut quotation {
            Some(q) => {
                q.status = quotation::Status::Accepted;
                q.responded_at = Some(q.responded_at.unwrap_or(now.coerce()));
                q.updated_at = Some(now.coerce());
                tx.execute(Update(q.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                Some(q.final_amount)
            }
            None => lead.budget,
        };

        // Step 3: open the project under a sequence-derived code.
        let sequence = tx
            .execute(Increment(project::Sequence))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let today = now.date::<()>();
        let project = Project {
            id: project::Id::new(),
            code: project::Code::generate(today.year(), sequence),
            name: project::Name::for_lead(
                &lead.name,
                lead.project_type.as_ref(),
            ),
            description: lead.description.clone(),
            customer_id: customer.id,
            project_type: lead.project_type.clone(),
            phase: project::Phase::Planning,
            budget,
            sqft_area: lead.sqft_area,
            plot_area: lead.plot_area,
            floors: lead.floors,
            location: lead.location.clone(),
            state: lead.state.clone(),
            district: lead.district.clone(),
            start_date: Some(start_date.unwrap_or_else(|| today.coerce())),
            converted_from_lead: lead_id,
            converted_by: actor,
            converted_at: now.coerce(),
            created_at: now.coerce(),
        };
        tx.execute(Insert(project.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Step 4: install the project manager, if requested.
        if let Some(manager_id) = project_manager {
            let manager = tx
                .execute(Select(By::<Option<User>, _>::new(manager_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(manager_id))
                .map_err(tracerr::wrap!())?;
            tx.execute(Insert(project::Member {
                project_id: project.id,
                user_id: manager.id,
                role: project::Role::ProjectManager,
                added_at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        }

        // Step 5: seed the bill of quantities from the quotation.
        if let Some(q) = &quotation {
            for item in &q.items {
                tx.execute(Insert(boq::Item::migrated(
                    project.id,
                    &q.number,
                    item,
                    now.coerce(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            }
        }

        // Steps 6-7: migrate documents and re-link the activity feed.
        // Failures here roll the whole conversion back: a silently
        // incomplete migration is worse than a retried conversion.
        let documents = tx
            .execute(Select(By::<Vec<Document>, _>::new(lead_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for document in &documents {
            tx.execute(Insert(document.copied_to(project.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        let records = tx
            .execute(Select(By::<Vec<activity::Record>, _>::new(lead_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for mut record in records {
            record.project_id = Some(project.id);
            tx.execute(Update(record))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        // Step 8: finalize the lead. The one authorized `WON` setter.
        lead.status = lead::Status::Won;
        lead.converted_at = Some(now.coerce());
        lead.converted_by = actor;
        lead.updated_at = Some(now.coerce());
        tx.execute(Update(lead.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(mail) = welcome {
            if let Err(e) = self.mailer().execute(mail).await {
                tracing::warn!("failed to send welcome mail: {e}");
            }
        }
        self.record_activity(activity::Record {
            id: activity::Id::new(),
            lead_id,
            project_id: Some(project.id),
            kind: activity::Kind::LeadConverted,
            title: format!(
                "Lead converted into project {}",
                project.code,
            )
            .into(),
            description: None,
            actor,
            occurred_at: now.coerce(),
        })
        .await;

        Ok(project)
    }
}

/// Error of [`ConvertLead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Lead`] was already converted.
    #[display("`Lead(id: {_0})` is already converted")]
    AlreadyConverted(#[error(not(source))] lead::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lead`] is lost and cannot be converted.
    #[display("`Lead(id: {_0})` is lost and cannot be converted")]
    LeadLost(#[error(not(source))] lead::Id),

    /// [`Lead`] with the provided ID does not exist.
    #[display("`Lead(id: {_0})` does not exist")]
    LeadNotExists(#[error(not(source))] lead::Id),

    /// [`Lead`] has no email address to resolve a [`Customer`] by.
    #[display("`Lead(id: {_0})` has no email address")]
    LeadWithoutEmail(#[error(not(source))] lead::Id),

    /// [`Quotation`] with the provided ID does not exist.
    #[display("`Quotation(id: {_0})` does not exist")]
    QuotationNotExists(#[error(not(source))] quotation::Id),

    /// [`Quotation`] belongs to another [`Lead`].
    #[display(
        "`Quotation(id: {quotation})` doesn't belong to `Lead(id: {lead})`"
    )]
    QuotationNotOfLead {
        /// ID of the [`Quotation`].
        quotation: quotation::Id,

        /// ID of the [`Lead`] being converted.
        lead: lead::Id,
    },

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
