//! In-memory collaborators driving the service end-to-end.
//!
//! `TestDb` implements the store operation contracts over a plain
//! `State` behind a mutex. A transaction clones the whole `State` and
//! applies writes to the clone, so dropping it without a commit rolls
//! everything back, while reads inside the transaction observe its own
//! writes. `Commit` swaps the clone back in.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex},
};

use common::{
    operations::{
        By, Commit, Delete, Increment, Insert, Lock, Select, Transact,
        Update,
    },
    pagination, DateTime, Handler,
};
use service::{
    domain::{
        activity, boq, document, lead, project, quotation, score_history,
        user, Customer, Document, Lead, Project, Quotation, User,
    },
    infra::{database, email},
    read, Config, Service,
};
use tracerr::Traced;

/// Service wired to the in-memory collaborators.
pub type TestService = Service<TestDb, TestMailer>;

/// Everything the store holds, cloned wholesale per transaction.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub leads: HashMap<lead::Id, Lead>,
    pub users: HashMap<user::Id, User>,
    pub customers: Vec<Customer>,
    pub projects: Vec<Project>,
    pub members: Vec<project::Member>,
    pub quotations: HashMap<quotation::Id, Quotation>,
    pub boq_items: Vec<boq::Item>,
    pub documents: Vec<Document>,
    pub activities: Vec<activity::Record>,
    pub score_history: Vec<score_history::Record>,
    pub quotation_seq: u64,
    pub project_seq: u64,

    /// Operation labels that fail on execution, for fault injection.
    pub fail: HashSet<&'static str>,
}

/// In-memory database handle.
#[derive(Clone, Debug, Default)]
pub struct TestDb {
    state: Arc<Mutex<State>>,
}

impl TestDb {
    /// Makes the operation labelled `label` fail from now on.
    pub fn fail_on(&self, label: &'static str) {
        let _ = self.state.lock().unwrap().fail.insert(label);
    }

    /// Runs `f` over the committed state.
    pub fn inspect<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    /// Puts the given entity directly into the committed state.
    pub fn seed(&self, f: impl FnOnce(&mut State)) {
        f(&mut self.state.lock().unwrap());
    }

    fn run<R>(
        &self,
        label: &'static str,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut state = self.state.lock().unwrap();
        if state.fail.contains(label) {
            return Err(tracerr::new!(database::Error::Store(format!(
                "injected failure: {label}",
            ))));
        }
        Ok(f(&mut state))
    }
}

/// In-memory transaction: a full clone of the [`State`] at its start.
#[derive(Clone, Debug)]
pub struct TestTx {
    db: Arc<Mutex<State>>,
    snapshot: Arc<Mutex<State>>,
}

impl TestTx {
    fn run<R>(
        &self,
        label: &'static str,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut state = self.snapshot.lock().unwrap();
        if state.fail.contains(label) {
            return Err(tracerr::new!(database::Error::Store(format!(
                "injected failure: {label}",
            ))));
        }
        Ok(f(&mut state))
    }
}

impl Handler<Transact> for TestDb {
    type Ok = TestTx;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let snapshot = self.state.lock().unwrap().clone();
        Ok(TestTx {
            db: Arc::clone(&self.state),
            snapshot: Arc::new(Mutex::new(snapshot)),
        })
    }
}

impl Handler<Commit> for TestTx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let snapshot = self.run("commit", |s| s.clone())?;
        *self.db.lock().unwrap() = snapshot;
        Ok(())
    }
}

/// Implements a store operation over the mutable [`State`].
macro_rules! db_op {
    ($target:ty, $args:ty, $ok:ty, $label:literal,
     |$state:ident, $arg:ident| $body:expr) => {
        impl Handler<$args> for $target {
            type Ok = $ok;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                $arg: $args,
            ) -> Result<Self::Ok, Self::Err> {
                self.run($label, |$state| $body)
            }
        }
    };
}

// Locks are no-ops: the state mutex already serializes everything.
db_op!(TestTx, Lock<By<Lead, lead::Id>>, (), "lock_lead", |_s, _a| ());
db_op!(
    TestTx, Lock<By<Quotation, quotation::Id>>, (), "lock_quotation",
    |_s, _a| ()
);

db_op!(
    TestTx, Select<By<Option<Lead>, lead::Id>>, Option<Lead>, "select_lead",
    |s, a| s.leads.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestDb, Select<By<Option<Lead>, lead::Id>>, Option<Lead>, "select_lead",
    |s, a| s.leads.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestTx, Select<By<Option<User>, user::Id>>, Option<User>, "select_user",
    |s, a| s.users.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestDb, Select<By<Option<User>, user::Id>>, Option<User>, "select_user",
    |s, a| s.users.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestTx, Select<By<Option<Quotation>, quotation::Id>>, Option<Quotation>,
    "select_quotation",
    |s, a| s.quotations.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestDb, Select<By<Option<Quotation>, quotation::Id>>, Option<Quotation>,
    "select_quotation",
    |s, a| s.quotations.get(&a.0.into_inner()).cloned()
);
db_op!(
    TestTx, Select<By<Option<Customer>, lead::Email>>, Option<Customer>,
    "select_customer",
    |s, a| {
        let email = a.0.into_inner();
        s.customers.iter().find(|c| c.email == email).cloned()
    }
);
db_op!(
    TestTx, Select<By<read::project::ExistsForLead, lead::Id>>,
    read::project::ExistsForLead, "select_project_exists",
    |s, a| {
        let id = a.0.into_inner();
        read::project::ExistsForLead(
            s.projects.iter().any(|p| p.converted_from_lead == id),
        )
    }
);
db_op!(
    TestTx, Select<By<Vec<Document>, lead::Id>>, Vec<Document>,
    "select_documents",
    |s, a| {
        let id = a.0.into_inner();
        s.documents
            .iter()
            .filter(|d| d.owner == document::Owner::Lead(id))
            .cloned()
            .collect()
    }
);
db_op!(
    TestTx, Select<By<Vec<activity::Record>, lead::Id>>,
    Vec<activity::Record>, "select_activities",
    |s, a| {
        let id = a.0.into_inner();
        s.activities
            .iter()
            .filter(|r| r.lead_id == id)
            .cloned()
            .collect()
    }
);
db_op!(
    TestTx, Select<By<read::quotation::NextVersion, lead::Id>>,
    read::quotation::NextVersion, "select_next_version",
    |s, a| {
        let id = a.0.into_inner();
        read::quotation::NextVersion(
            s.quotations
                .values()
                .filter(|q| q.lead_id == id)
                .map(|q| q.version)
                .max()
                .map_or(quotation::Version::FIRST, quotation::Version::next),
        )
    }
);

db_op!(
    TestTx, Increment<quotation::Sequence>, u64, "increment_quotation_seq",
    |s, _a| {
        s.quotation_seq += 1;
        s.quotation_seq
    }
);
db_op!(
    TestTx, Increment<project::Sequence>, u64, "increment_project_seq",
    |s, _a| {
        s.project_seq += 1;
        s.project_seq
    }
);

db_op!(TestTx, Insert<Lead>, (), "insert_lead", |s, a| {
    let _ = s.leads.insert(a.0.id, a.0);
});
db_op!(
    TestTx, Insert<score_history::Record>, (), "insert_score_history",
    |s, a| s.score_history.push(a.0)
);
db_op!(TestTx, Insert<Customer>, (), "insert_customer", |s, a| {
    s.customers.push(a.0);
});
db_op!(TestTx, Insert<Project>, (), "insert_project", |s, a| {
    s.projects.push(a.0);
});
db_op!(TestTx, Insert<project::Member>, (), "insert_member", |s, a| {
    s.members.push(a.0);
});
db_op!(TestTx, Insert<boq::Item>, (), "insert_boq_item", |s, a| {
    s.boq_items.push(a.0);
});
db_op!(TestTx, Insert<Document>, (), "insert_document", |s, a| {
    s.documents.push(a.0);
});
db_op!(TestTx, Insert<Quotation>, (), "insert_quotation", |s, a| {
    let _ = s.quotations.insert(a.0.id, a.0);
});
db_op!(
    TestDb, Insert<activity::Record>, (), "insert_activity",
    |s, a| s.activities.push(a.0)
);

db_op!(TestTx, Update<Lead>, (), "update_lead", |s, a| {
    let _ = s.leads.insert(a.0.id, a.0);
});
db_op!(TestTx, Update<Quotation>, (), "update_quotation", |s, a| {
    let _ = s.quotations.insert(a.0.id, a.0);
});
db_op!(
    TestTx, Update<activity::Record>, (), "update_activity",
    |s, a| {
        let record = a.0;
        if let Some(slot) =
            s.activities.iter_mut().find(|r| r.id == record.id)
        {
            *slot = record;
        }
    }
);

db_op!(
    TestTx, Delete<quotation::Id>, (), "delete_quotation",
    |s, a| {
        let _ = s.quotations.remove(&a.0);
    }
);

// Read models served off the committed state, for the query layer.

db_op!(
    TestDb, Select<By<read::lead::list::Page, read::lead::list::Selector>>,
    read::lead::list::Page, "select_lead_list",
    |s, a| {
        let selector = a.0.into_inner();
        let mut matched: Vec<&Lead> = s
            .leads
            .values()
            .filter(|l| selector.filter.matches(l))
            .collect();
        matched.sort_by(|a, b| {
            use read::lead::list::SortField as F;
            let ordering = match selector.sort.field {
                F::CreatedAt => a.created_at.cmp(&b.created_at),
                F::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                F::Name => {
                    let (a, b): (&str, &str) =
                        (a.name.as_ref(), b.name.as_ref());
                    a.cmp(b)
                }
                F::Score => a.score.cmp(&b.score),
                F::Priority => a.priority.cmp(&b.priority),
                F::Status => a.status.cmp(&b.status),
                F::DateOfEnquiry => {
                    a.date_of_enquiry.cmp(&b.date_of_enquiry)
                }
                F::NextFollowUp => {
                    a.next_follow_up_at.cmp(&b.next_follow_up_at)
                }
                F::Budget => a.budget.cmp(&b.budget),
            };
            match selector.sort.order {
                pagination::Order::Ascending => ordering,
                pagination::Order::Descending => ordering.reverse(),
            }
        });
        let total = matched.len() as u64;
        let nodes = matched
            .into_iter()
            .skip(selector.arguments.offset())
            .take(selector.arguments.limit())
            .map(|l| l.id)
            .collect();
        read::lead::list::Page {
            nodes,
            total,
            arguments: selector.arguments,
        }
    }
);
db_op!(
    TestDb, Select<By<Vec<lead::Id>, read::lead::Overdue>>, Vec<lead::Id>,
    "select_overdue",
    |s, _a| {
        let now = DateTime::now().coerce();
        s.leads
            .values()
            .filter(|l| {
                !l.status.is_terminal()
                    && l.next_follow_up_at.is_some_and(|at| at < now)
            })
            .map(|l| l.id)
            .collect()
    }
);
db_op!(
    TestDb, Select<By<read::lead::StatusDistribution, ()>>,
    read::lead::StatusDistribution, "select_status_distribution",
    |s, _a| {
        let mut counts = BTreeMap::new();
        for l in s.leads.values() {
            *counts.entry(l.status).or_insert(0) += 1;
        }
        read::lead::StatusDistribution(counts)
    }
);
db_op!(
    TestDb, Select<By<read::lead::SourceDistribution, ()>>,
    read::lead::SourceDistribution, "select_source_distribution",
    |s, _a| {
        let mut counts = BTreeMap::new();
        for l in s.leads.values() {
            if let Some(source) = &l.source {
                *counts.entry(source.clone()).or_insert(0) += 1;
            }
        }
        read::lead::SourceDistribution(counts)
    }
);
db_op!(
    TestDb, Select<By<read::lead::ConversionMetrics, ()>>,
    read::lead::ConversionMetrics, "select_conversion_metrics",
    |s, _a| {
        let total = s.leads.len() as u64;
        let converted = s
            .leads
            .values()
            .filter(|l| l.status == lead::Status::Won)
            .count() as u64;
        read::lead::ConversionMetrics::new(total, converted)
    }
);
db_op!(
    TestDb, Select<By<Vec<Quotation>, lead::Id>>, Vec<Quotation>,
    "select_quotations_for_lead",
    |s, a| {
        let id = a.0.into_inner();
        let mut quotations: Vec<Quotation> = s
            .quotations
            .values()
            .filter(|q| q.lead_id == id)
            .cloned()
            .collect();
        quotations.sort_by(|a, b| b.version.cmp(&a.version));
        quotations
    }
);
db_op!(
    TestDb, Select<By<Vec<score_history::Record>, lead::Id>>,
    Vec<score_history::Record>, "select_score_history",
    |s, a| {
        let id = a.0.into_inner();
        let mut records: Vec<score_history::Record> = s
            .score_history
            .iter()
            .filter(|r| r.lead_id == id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.scored_at.cmp(&a.scored_at));
        records
    }
);
db_op!(
    TestDb, Select<By<read::quotation::list::Page, read::quotation::list::Selector>>,
    read::quotation::list::Page, "select_quotation_list",
    |s, a| {
        let selector = a.0.into_inner();
        let mut matched: Vec<&Quotation> = s
            .quotations
            .values()
            .filter(|q| selector.filter.matches(q))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as u64;
        let nodes = matched
            .into_iter()
            .skip(selector.arguments.offset())
            .take(selector.arguments.limit())
            .map(|q| q.id)
            .collect();
        read::quotation::list::Page {
            nodes,
            total,
            arguments: selector.arguments,
        }
    }
);
db_op!(
    TestDb, Select<By<Option<read::score_history::Latest>, lead::Id>>,
    Option<read::score_history::Latest>, "select_score_history_latest",
    |s, a| {
        let id = a.0.into_inner();
        s.score_history
            .iter()
            .filter(|r| r.lead_id == id)
            .max_by_key(|r| r.scored_at)
            .cloned()
            .map(read::score_history::Latest)
    }
);
db_op!(
    TestDb, Select<By<read::score_history::Count, lead::Id>>,
    read::score_history::Count, "select_score_history_count",
    |s, a| {
        let id = a.0.into_inner();
        read::score_history::Count(
            s.score_history.iter().filter(|r| r.lead_id == id).count()
                as u64,
        )
    }
);

/// Outbound mail recorded by [`TestMailer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mail {
    Welcome(lead::Email),
    StatusChange(lead::Status, lead::Status),
    HotLeadAlert(lead::Id),
}

/// In-memory mail recorder.
#[derive(Clone, Debug, Default)]
pub struct TestMailer {
    sent: Arc<Mutex<Vec<Mail>>>,
    fail: Arc<Mutex<bool>>,
}

impl TestMailer {
    /// Makes every send fail from now on.
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Returns everything sent so far.
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, mail: Mail) -> Result<(), Traced<email::Error>> {
        if *self.fail.lock().unwrap() {
            return Err(tracerr::new!(email::Error::Send(
                "injected failure".into(),
            )));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

impl Handler<email::Welcome> for TestMailer {
    type Ok = ();
    type Err = Traced<email::Error>;

    async fn execute(
        &self,
        mail: email::Welcome,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(Mail::Welcome(mail.to))
    }
}

impl Handler<email::StatusChange> for TestMailer {
    type Ok = ();
    type Err = Traced<email::Error>;

    async fn execute(
        &self,
        mail: email::StatusChange,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(Mail::StatusChange(mail.from, mail.into))
    }
}

impl Handler<email::HotLeadAlert> for TestMailer {
    type Ok = ();
    type Err = Traced<email::Error>;

    async fn execute(
        &self,
        mail: email::HotLeadAlert,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(Mail::HotLeadAlert(mail.lead_id))
    }
}

/// Wires a [`TestService`] over fresh in-memory collaborators, returning
/// the shared handles alongside.
pub fn wire() -> (TestService, TestDb, TestMailer) {
    let db = TestDb::default();
    let mailer = TestMailer::default();
    (
        Service::new(Config::default(), db.clone(), mailer.clone()),
        db,
        mailer,
    )
}

/// Registers a user and returns its ID.
pub fn seed_user(db: &TestDb, name: &str) -> user::Id {
    let id = user::Id::new();
    let user = User {
        id,
        name: user::Name::new(name).unwrap(),
        email: None,
        created_at: DateTime::now().coerce(),
        deleted_at: None,
    };
    db.seed(|s| {
        let _ = s.users.insert(id, user);
    });
    id
}

/// Bare minimum intake command: just a name, everything else default.
pub fn intake(name: &str) -> service::command::CreateLead {
    service::command::CreateLead {
        name: lead::Name::new(name).unwrap(),
        email: None,
        phone: None,
        whatsapp: None,
        customer_type: None,
        project_type: None,
        source: None,
        priority: None,
        budget: None,
        sqft_area: None,
        plot_area: None,
        floors: None,
        description: None,
        requirements: None,
        notes: None,
        state: None,
        district: None,
        location: None,
        address: None,
        client_rating: None,
        probability_to_win: None,
        assigned_to: None,
        date_of_enquiry: None,
        next_follow_up_at: None,
    }
}
