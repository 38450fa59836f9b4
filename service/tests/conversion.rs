//! Lead conversion: one atomic unit of work producing a customer, a
//! project and its bill of quantities.

mod support;

use std::str::FromStr as _;

use common::{DateTime, Money};
use service::{
    command::{
        convert_lead, ConvertLead, CreateQuotation, NewItem, SendQuotation,
        UpdateLead,
    },
    domain::{
        activity, customer, document, lead, project, quotation, Customer,
        Document,
    },
    query, Command as _,
};

use self::support::{intake, seed_user, wire, Mail, TestService};

async fn new_lead(svc: &TestService, email: Option<&str>) -> lead::Id {
    let mut cmd = intake("Anil Kumar Rao");
    cmd.email = email.and_then(lead::Email::new);
    svc.execute(cmd).await.unwrap().id
}

async fn sent_quotation(
    svc: &TestService,
    lead_id: lead::Id,
) -> quotation::Id {
    let quotation = svc
        .execute(CreateQuotation {
            lead_id,
            title: quotation::Title::new("Residential construction")
                .unwrap(),
            description: None,
            items: vec![NewItem {
                description: lead::Text::new("Earthwork").unwrap(),
                quantity: quotation::Quantity::from_str("2").unwrap(),
                unit_price: Money::from_str("1000").unwrap(),
            }],
            total_amount: None,
            tax_amount: None,
            discount_amount: None,
            validity_days: None,
            notes: None,
            created_by: None,
        })
        .await
        .unwrap();
    let _ = svc
        .execute(SendQuotation {
            id: quotation.id,
            actor: None,
        })
        .await
        .unwrap();
    quotation.id
}

fn convert(lead_id: lead::Id) -> ConvertLead {
    ConvertLead {
        lead_id,
        quotation_id: None,
        project_manager: None,
        start_date: None,
        actor: None,
    }
}

#[tokio::test]
async fn quotation_backed_conversion_migrates_everything() {
    let (svc, db, mailer) = wire();
    let actor = seed_user(&db, "Ravi Pillai");
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;
    let quotation_id = sent_quotation(&svc, lead_id).await;

    let project = svc
        .execute(ConvertLead {
            lead_id,
            quotation_id: Some(quotation_id),
            project_manager: Some(actor),
            start_date: None,
            actor: Some(actor),
        })
        .await
        .unwrap();

    // The accepted quotation's final amount becomes the budget.
    assert_eq!(project.budget, Some(Money::from_str("2000").unwrap()));
    assert_eq!(project.phase, project::Phase::Planning);
    assert_eq!(project.converted_from_lead, lead_id);
    assert_eq!(project.converted_by, Some(actor));
    assert!(project.start_date.is_some());
    let code: &str = project.code.as_ref();
    assert!(code.starts_with("PRJ-"));
    assert!(code.ends_with("-0001"));

    let lead = svc
        .execute(query::lead::ById::by(lead_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lead.status, lead::Status::Won);
    assert!(lead.converted_at.is_some());
    assert_eq!(lead.converted_by, Some(actor));

    let quotation = svc
        .execute(query::quotation::ById::by(quotation_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(quotation.status, quotation::Status::Accepted);
    assert!(quotation.responded_at.is_some());

    db.inspect(|s| {
        // Customer split off the lead's full name.
        assert_eq!(s.customers.len(), 1);
        let customer = &s.customers[0];
        assert_eq!(customer.first_name.as_ref() as &str, "Anil Kumar");
        assert_eq!(customer.last_name.as_ref() as &str, "Rao");
        assert_eq!(customer.lead_id, lead_id);

        // Quotation items became bill-of-quantities lines as quoted.
        assert_eq!(s.boq_items.len(), 1);
        let line = &s.boq_items[0];
        assert_eq!(line.project_id, project.id);
        assert_eq!(line.unit_rate, Money::from_str("1000").unwrap());
        assert_eq!(line.total, Money::from_str("2000").unwrap());
        assert_eq!(line.work_type.as_ref() as &str, "General Works");
        assert_eq!(line.unit.as_ref() as &str, "LS");
        let note: &str = line.note.as_ref().unwrap().as_ref();
        assert!(note.starts_with("Migrated from quotation QUO-"));

        assert_eq!(s.members.len(), 1);
        assert_eq!(s.members[0].role, project::Role::ProjectManager);

        // The whole feed now also references the project.
        assert!(s
            .activities
            .iter()
            .filter(|r| r.lead_id == lead_id)
            .all(|r| r.project_id == Some(project.id)));
        assert!(s
            .activities
            .iter()
            .any(|r| r.kind == activity::Kind::LeadConverted));
    });

    let welcomed = mailer
        .sent()
        .into_iter()
        .any(|m| m == Mail::Welcome(lead::Email::new("anil@example.com").unwrap()));
    assert!(welcomed);
}

#[tokio::test]
async fn conversion_without_quotation_falls_back_to_the_lead_budget() {
    let (svc, db, _mailer) = wire();
    let mut cmd = intake("Asha Menon");
    cmd.email = lead::Email::new("asha@example.com");
    cmd.budget = Some(Money::from_str("750000").unwrap());
    let lead = svc.execute(cmd).await.unwrap();

    let project = svc.execute(convert(lead.id)).await.unwrap();

    assert_eq!(project.budget, Some(Money::from_str("750000").unwrap()));
    db.inspect(|s| assert!(s.boq_items.is_empty()));
}

#[tokio::test]
async fn second_conversion_is_rejected_without_side_effects() {
    use convert_lead::ExecutionError as E;

    let (svc, db, _mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;
    let quotation_id = sent_quotation(&svc, lead_id).await;

    let mut cmd = convert(lead_id);
    cmd.quotation_id = Some(quotation_id);
    let _ = svc.execute(cmd).await.unwrap();

    let err = svc.execute(convert(lead_id)).await.unwrap_err();
    assert!(matches!(err.as_ref(), E::AlreadyConverted(_)));

    db.inspect(|s| {
        assert_eq!(s.customers.len(), 1);
        assert_eq!(s.projects.len(), 1);
        assert_eq!(s.boq_items.len(), 1);
    });
}

#[tokio::test]
async fn lost_leads_cannot_be_converted() {
    use convert_lead::ExecutionError as E;

    let (svc, db, _mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;
    let _ = svc
        .execute(UpdateLead {
            id: lead_id,
            status: Some(lead::Status::Lost),
            ..UpdateLead::default()
        })
        .await
        .unwrap();

    let err = svc.execute(convert(lead_id)).await.unwrap_err();
    assert!(matches!(err.as_ref(), E::LeadLost(_)));

    db.inspect(|s| {
        assert!(s.customers.is_empty());
        assert!(s.projects.is_empty());
    });
}

#[tokio::test]
async fn conversion_requires_an_email_address() {
    use convert_lead::ExecutionError as E;

    let (svc, _db, _mailer) = wire();
    let lead_id = new_lead(&svc, None).await;

    let err = svc.execute(convert(lead_id)).await.unwrap_err();
    assert!(matches!(err.as_ref(), E::LeadWithoutEmail(_)));
}

#[tokio::test]
async fn foreign_quotations_are_rejected() {
    use convert_lead::ExecutionError as E;

    let (svc, _db, _mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;
    let other_id = new_lead(&svc, Some("asha@example.com")).await;
    let foreign = sent_quotation(&svc, other_id).await;

    let mut cmd = convert(lead_id);
    cmd.quotation_id = Some(foreign);
    let err = svc.execute(cmd).await.unwrap_err();
    assert!(matches!(err.as_ref(), E::QuotationNotOfLead { .. }));
}

#[tokio::test]
async fn a_failure_mid_conversion_leaves_no_partial_state() {
    use convert_lead::ExecutionError as E;

    let (svc, db, mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;
    let quotation_id = sent_quotation(&svc, lead_id).await;

    db.fail_on("insert_boq_item");
    let mut cmd = convert(lead_id);
    cmd.quotation_id = Some(quotation_id);
    let err = svc.execute(cmd).await.unwrap_err();
    assert!(matches!(err.as_ref(), E::Db(_)));

    db.inspect(|s| {
        assert!(s.customers.is_empty());
        assert!(s.projects.is_empty());
        assert!(s.boq_items.is_empty());
        assert_eq!(
            s.leads.get(&lead_id).unwrap().status,
            lead::Status::NewInquiry,
        );
        assert_eq!(
            s.quotations.get(&quotation_id).unwrap().status,
            quotation::Status::Sent,
        );
    });
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn existing_customers_are_reused_by_email() {
    let (svc, db, mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;

    let (first_name, last_name) =
        customer::split_name(&lead::Name::new("Anil Kumar Rao").unwrap());
    let existing = Customer {
        id: customer::Id::new(),
        first_name,
        last_name,
        email: lead::Email::new("anil@example.com").unwrap(),
        phone: None,
        whatsapp: None,
        address: None,
        state: None,
        district: None,
        source: None,
        notes: None,
        password_hash: customer::PasswordHash::new(
            &customer::Password::generate(),
        ),
        lead_id,
        created_at: DateTime::now().coerce(),
    };
    let existing_id = existing.id;
    db.seed(|s| s.customers.push(existing));

    let project = svc.execute(convert(lead_id)).await.unwrap();

    db.inspect(|s| {
        assert_eq!(s.customers.len(), 1);
        assert_eq!(s.projects[0].customer_id, existing_id);
    });
    assert_eq!(project.customer_id, existing_id);
    // No fresh credentials, so no welcome mail.
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn documents_are_copied_to_the_project() {
    let (svc, db, _mailer) = wire();
    let lead_id = new_lead(&svc, Some("anil@example.com")).await;

    let uploaded = Document {
        id: document::Id::new(),
        owner: document::Owner::Lead(lead_id),
        file_name: "site-plan.pdf".parse().unwrap(),
        storage_key: document::StorageKey::from(
            "leads/site-plan.pdf".to_owned(),
        ),
        content_type: "application/pdf".parse().ok(),
        size: Some(64_000),
        uploaded_by: None,
        uploaded_at: DateTime::now().coerce(),
    };
    let original_id = uploaded.id;
    db.seed(|s| s.documents.push(uploaded));

    let project = svc.execute(convert(lead_id)).await.unwrap();

    db.inspect(|s| {
        assert_eq!(s.documents.len(), 2);
        let copy = s
            .documents
            .iter()
            .find(|d| d.owner == document::Owner::Project(project.id))
            .unwrap();
        assert_ne!(copy.id, original_id);
        assert_eq!(copy.storage_key.as_ref() as &str, "leads/site-plan.pdf");
        // The original stays with the lead.
        assert!(s
            .documents
            .iter()
            .any(|d| d.owner == document::Owner::Lead(lead_id)));
    });
}

#[tokio::test]
async fn conversion_moves_the_funnel_metrics() {
    let (svc, _db, _mailer) = wire();
    let converted = new_lead(&svc, Some("anil@example.com")).await;
    let _ = new_lead(&svc, Some("asha@example.com")).await;

    let _ = svc.execute(convert(converted)).await.unwrap();

    let metrics = svc
        .execute(query::leads::ConversionMetrics::by(()))
        .await
        .unwrap();
    assert_eq!(metrics.total, 2);
    assert_eq!(metrics.converted, 1);
    assert_eq!(metrics.conversion_rate, common::Percent::ratio(1, 2));
}
