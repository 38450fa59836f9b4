//! Lead intake, scoring and status lifecycle, driven end-to-end.

mod support;

use std::{str::FromStr as _, time::Duration};

use common::{pagination, DateTime, Money};
use service::{
    command::{update_lead, UpdateLead},
    domain::{activity, lead, score},
    query, read, Command as _,
};

use self::support::{intake, seed_user, wire, Mail};

#[tokio::test]
async fn walk_in_intake_gets_safe_defaults() {
    let (svc, db, mailer) = wire();

    let mut cmd = intake("Asha Menon");
    cmd.source = lead::Source::new("walk-in");
    let lead = svc.execute(cmd).await.unwrap();

    assert_eq!(lead.status, lead::Status::NewInquiry);
    assert_eq!(lead.priority, lead::Priority::Low);
    assert_eq!(u8::from(lead.score), 0);
    assert_eq!(lead.score_category, score::Category::Cold);
    assert_eq!(lead.date_of_enquiry, lead::EnquiryDate::today());
    assert_eq!(
        lead.source.as_ref().map(|s| s.as_ref() as &str),
        Some("walk_in"),
    );

    // A zero score produces no baseline history and no alert.
    let count = svc
        .execute(query::score_history::Count::by(lead.id))
        .await
        .unwrap();
    assert_eq!(*count, 0);
    assert!(mailer.sent().is_empty());

    db.inspect(|s| {
        assert_eq!(s.activities.len(), 1);
        assert_eq!(s.activities[0].kind, activity::Kind::LeadCreated);
        assert_eq!(s.activities[0].lead_id, lead.id);
    });
}

#[tokio::test]
async fn referral_with_high_budget_scores_warm() {
    let (svc, _db, _mailer) = wire();

    let mut cmd = intake("Anil Kumar Rao");
    cmd.budget = Some(Money::from_str("6000000").unwrap());
    cmd.source = lead::Source::new("Website Referral Program");
    let lead = svc.execute(cmd).await.unwrap();

    assert_eq!(u8::from(lead.score), 40);
    assert_eq!(lead.score_category, score::Category::Warm);
    assert_eq!(lead.score_factors.points("High Budget"), Some(20));
    assert_eq!(lead.score_factors.points("Referral"), Some(20));
    assert!(lead.last_scored_at.is_some());

    let history = svc
        .execute(query::score_history::ForLead::by(lead.id))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(u8::from(history[0].previous_score), 0);
    assert_eq!(u8::from(history[0].new_score), 40);
    assert_eq!(history[0].previous_category, score::Category::Cold);
    assert_eq!(history[0].new_category, score::Category::Warm);
}

#[tokio::test]
async fn assignment_resolves_the_user() {
    let (svc, db, _mailer) = wire();
    let user_id = seed_user(&db, "Ravi Pillai");

    let mut cmd = intake("Asha Menon");
    cmd.assigned_to = Some(user_id);
    let lead = svc.execute(cmd).await.unwrap();

    assert_eq!(lead.assigned_to, Some(user_id));
    assert_eq!(
        lead.assigned_team.as_ref().map(|t| t.as_ref() as &str),
        Some("Ravi Pillai"),
    );
    db.inspect(|s| {
        assert!(s
            .activities
            .iter()
            .any(|r| r.kind == activity::Kind::LeadAssigned));
    });
}

#[tokio::test]
async fn assignment_to_unknown_user_is_rejected() {
    use service::command::create_lead::ExecutionError as E;

    let (svc, _db, _mailer) = wire();

    let mut cmd = intake("Asha Menon");
    cmd.assigned_to = Some(service::domain::user::Id::new());
    let err = svc.execute(cmd).await.unwrap_err();

    assert!(matches!(err.as_ref(), E::UserNotExists(_)));
}

#[tokio::test]
async fn status_change_records_activity_and_notifies() {
    let (svc, db, mailer) = wire();

    let mut cmd = intake("Asha Menon");
    cmd.email = lead::Email::new("asha@example.com");
    let lead = svc.execute(cmd).await.unwrap();

    let lead = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::Qualified),
            ..UpdateLead::default()
        })
        .await
        .unwrap();
    let lead = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::ProposalSent),
            ..UpdateLead::default()
        })
        .await
        .unwrap();
    assert_eq!(lead.status, lead::Status::ProposalSent);
    assert!(lead.updated_at.is_some());

    db.inspect(|s| {
        let changes: Vec<_> = s
            .activities
            .iter()
            .filter(|r| r.kind == activity::Kind::StatusChanged)
            .collect();
        assert_eq!(changes.len(), 2);
    });
    assert_eq!(
        mailer.sent(),
        vec![
            Mail::StatusChange(
                lead::Status::NewInquiry,
                lead::Status::Qualified,
            ),
            Mail::StatusChange(
                lead::Status::Qualified,
                lead::Status::ProposalSent,
            ),
        ],
    );
}

#[tokio::test]
async fn notification_failure_never_fails_the_update() {
    let (svc, _db, mailer) = wire();

    let mut cmd = intake("Asha Menon");
    cmd.email = lead::Email::new("asha@example.com");
    let lead = svc.execute(cmd).await.unwrap();

    mailer.fail();
    let lead = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::Contacted),
            ..UpdateLead::default()
        })
        .await
        .unwrap();
    assert_eq!(lead.status, lead::Status::Contacted);
}

#[tokio::test]
async fn terminal_leads_reject_further_transitions() {
    use update_lead::ExecutionError as E;

    let (svc, _db, _mailer) = wire();

    let lead = svc.execute(intake("Asha Menon")).await.unwrap();
    let lead = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::Lost),
            lost_reason: lead::Text::new("Chose a competitor"),
            ..UpdateLead::default()
        })
        .await
        .unwrap();
    assert_eq!(lead.status, lead::Status::Lost);

    let err = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::Qualified),
            ..UpdateLead::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err.as_ref(), E::LeadClosed { .. }));
}

#[tokio::test]
async fn won_is_unreachable_through_an_update() {
    use update_lead::ExecutionError as E;

    let (svc, _db, _mailer) = wire();

    let lead = svc.execute(intake("Asha Menon")).await.unwrap();
    let err = svc
        .execute(UpdateLead {
            id: lead.id,
            status: Some(lead::Status::Won),
            ..UpdateLead::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err.as_ref(), E::WonOnlyViaConversion(_)));
}

#[tokio::test]
async fn rescoring_on_update_appends_history() {
    let (svc, _db, _mailer) = wire();

    let lead = svc.execute(intake("Asha Menon")).await.unwrap();
    assert_eq!(u8::from(lead.score), 0);

    let lead = svc
        .execute(UpdateLead {
            id: lead.id,
            budget: Some(Money::from_str("2000000").unwrap()),
            ..UpdateLead::default()
        })
        .await
        .unwrap();
    assert_eq!(u8::from(lead.score), 10);

    let latest = svc
        .execute(query::score_history::Latest::by(lead.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(u8::from(latest.previous_score), 0);
    assert_eq!(u8::from(latest.new_score), 10);
}

#[tokio::test]
async fn listing_filters_sorts_and_paginates() {
    let (svc, _db, _mailer) = wire();

    let mut low = intake("Asha Menon");
    low.budget = Some(Money::from_str("100").unwrap());
    let low = svc.execute(low).await.unwrap();
    let mut high = intake("Anil Menon");
    high.budget = Some(Money::from_str("300").unwrap());
    let high = svc.execute(high).await.unwrap();
    let other = svc.execute(intake("Priya")).await.unwrap();

    let page = svc
        .execute(query::leads::List::by(read::lead::list::Selector {
            filter: read::lead::list::Filter {
                search: Some("menon".into()),
                ..read::lead::list::Filter::default()
            },
            sort: read::lead::list::Sort {
                field: read::lead::list::SortField::Budget,
                order: pagination::Order::Ascending,
            },
            arguments: pagination::Arguments::default(),
        }))
        .await
        .unwrap();
    assert_eq!(page.nodes, vec![low.id, high.id]);
    assert_eq!(page.total, 2);
    assert!(!page.has_more());
    assert!(!page.nodes.contains(&other.id));

    let page = svc
        .execute(query::leads::List::by(read::lead::list::Selector {
            filter: read::lead::list::Filter::default(),
            sort: read::lead::list::Sort::default(),
            arguments: pagination::Arguments::new(Some(1), Some(2)),
        }))
        .await
        .unwrap();
    assert_eq!(page.nodes.len(), 2);
    assert_eq!(page.total, 3);
    assert!(page.has_more());
}

#[tokio::test]
async fn overdue_follow_ups_are_reported() {
    let (svc, _db, _mailer) = wire();

    let mut overdue = intake("Asha Menon");
    overdue.next_follow_up_at =
        Some((DateTime::now() - Duration::from_secs(3600)).coerce());
    let overdue = svc.execute(overdue).await.unwrap();

    let mut upcoming = intake("Anil Kumar Rao");
    upcoming.next_follow_up_at =
        Some((DateTime::now() + Duration::from_secs(3600)).coerce());
    let upcoming = svc.execute(upcoming).await.unwrap();

    let unscheduled = svc.execute(intake("Priya")).await.unwrap();

    let ids = svc
        .execute(query::leads::Overdue::by(read::lead::Overdue))
        .await
        .unwrap();
    assert_eq!(ids, vec![overdue.id]);
    assert!(!ids.contains(&upcoming.id));
    assert!(!ids.contains(&unscheduled.id));
}

#[tokio::test]
async fn distributions_count_the_lead_base() {
    let (svc, _db, _mailer) = wire();

    let metrics = svc
        .execute(query::leads::ConversionMetrics::by(()))
        .await
        .unwrap();
    assert_eq!(metrics.total, 0);
    assert_eq!(metrics.conversion_rate, None);

    let mut referred = intake("Asha Menon");
    referred.source = lead::Source::new("referral");
    let _ = svc.execute(referred).await.unwrap();
    let walked_in = svc.execute(intake("Priya")).await.unwrap();
    let _ = svc
        .execute(UpdateLead {
            id: walked_in.id,
            status: Some(lead::Status::Contacted),
            ..UpdateLead::default()
        })
        .await
        .unwrap();

    let statuses = svc
        .execute(query::leads::StatusDistribution::by(()))
        .await
        .unwrap();
    assert_eq!(statuses.0.get(&lead::Status::NewInquiry), Some(&1));
    assert_eq!(statuses.0.get(&lead::Status::Contacted), Some(&1));

    let sources = svc
        .execute(query::leads::SourceDistribution::by(()))
        .await
        .unwrap();
    assert_eq!(
        sources.0.get(&lead::Source::new("referral").unwrap()),
        Some(&1),
    );
}
