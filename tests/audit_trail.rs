//! Integration tests for the audit trail: every mutation leaves exactly
//! one entry, entries are immutable, and ordering is stable.

mod common;

use chrono::Datelike;

use staffhub::core::types::pagination::PageRequest;
use staffhub::entity::audit::AuditAction;
use staffhub::service::{FileLeaveRequest, ReviewDecision, UpdateProfileRequest};

use common::{leave_window, past_date, short_tag, TestApp};

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_each_mutation_writes_exactly_one_entry() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    // hire -> 1 entry on the staff record.
    let entries = app
        .audit_repo
        .find_for_record("staff", staff.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Insert);
    assert_eq!(entries[0].table_name, "staff");
    assert_eq!(entries[0].record_id, staff.id);

    // profile update -> exactly one more.
    app.staff
        .update_profile(
            &app.ctx(),
            staff.id,
            UpdateProfileRequest {
                email: None,
                first_name: Some("Noor".into()),
                last_name: None,
            },
        )
        .await
        .unwrap();
    let entries = app
        .audit_repo
        .find_for_record("staff", staff.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].action, AuditAction::Update);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_leave_lifecycle_audits_application_record() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(3);
    let year = start.year();
    app.leave
        .grant_entitlement(&app.ctx(), staff.id, category, year, 21, 0)
        .await
        .unwrap();

    let application = app
        .leave
        .file_application(
            &app.ctx(),
            FileLeaveRequest {
                staff_id: staff.id,
                category_id: category,
                start_date: start,
                end_date: end,
                reason: None,
            },
        )
        .await
        .unwrap();

    app.leave
        .review(&app.ctx(), application.id, ReviewDecision::Approve, None)
        .await
        .unwrap();

    let entries = app
        .audit_repo
        .find_for_record("leave_applications", application.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2); // file + approve
    assert_eq!(entries[0].action, AuditAction::Insert);
    assert_eq!(entries[1].action, AuditAction::Update);

    // Both snapshots carry the entitlement alongside the application.
    for entry in &entries {
        let new = entry.new_values.as_ref().unwrap();
        assert!(new.get("application").is_some());
        assert!(new.get("entitlement").is_some());
    }

    // Ordering is (created_at, seq) ascending.
    assert!(entries[0].seq < entries[1].seq);
    assert!(entries[0].created_at <= entries[1].created_at);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_failed_operations_leave_no_entry() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    // No entitlement exists, so filing fails and the trail stays clean.
    let (start, end) = leave_window(2);
    let before = app
        .audit_repo
        .search(Some(app.actor_id), Some("leave_applications"), None, None, &PageRequest::default())
        .await
        .unwrap()
        .total_items;

    let _ = app
        .leave
        .file_application(
            &app.ctx(),
            FileLeaveRequest {
                staff_id: staff.id,
                category_id: app.seed.annual_category_id,
                start_date: start,
                end_date: end,
                reason: None,
            },
        )
        .await
        .unwrap_err();

    let after = app
        .audit_repo
        .search(Some(app.actor_id), Some("leave_applications"), None, None, &PageRequest::default())
        .await
        .unwrap()
        .total_items;
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_search_filters_by_actor_table_and_action() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let name = format!("CERT-{}", short_tag());
    let qualification = app
        .qualifications
        .record(
            &app.ctx(),
            staffhub::service::RecordQualificationRequest {
                staff_id: staff.id,
                qualification_type_id: app.seed.qualification_type_id,
                name,
                issue_date: common::date(2023, 1, 10),
                expiry_date: None,
            },
        )
        .await
        .unwrap();

    let page = PageRequest::new(1, 50);
    let results = app
        .audit_repo
        .search(
            Some(app.actor_id),
            Some("staff_qualifications"),
            Some(AuditAction::Insert),
            None,
            &page,
        )
        .await
        .unwrap();
    assert!(results.items.iter().any(|e| e.record_id == qualification.id));
    assert!(results
        .items
        .iter()
        .all(|e| e.table_name == "staff_qualifications" && e.action == AuditAction::Insert));
}
