//! Integration tests for the assignment ledger.

mod common;

use staffhub::core::error::ErrorKind;
use staffhub::core::types::pagination::PageRequest;
use staffhub::entity::assignment::AssignmentReason;
use staffhub::entity::staff::EmploymentStatus;
use staffhub::service::ReassignRequest;

use common::{date, future_date, past_date, TestApp};

fn transfer(app: &TestApp, start: chrono::NaiveDate) -> ReassignRequest {
    ReassignRequest {
        department_id: app.seed.other_department_id,
        facility_id: app.seed.facility_id,
        role_id: app.seed.role_id,
        rank_id: app.seed.senior_rank_id,
        start_date: start,
        reason: AssignmentReason::Transfer,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_reassign_closes_one_record_and_opens_one() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let new_start = date(2021, 7, 1);
    let opened = app
        .assignments
        .reassign(&app.ctx(), staff.id, transfer(&app, new_start))
        .await
        .unwrap();

    assert!(opened.is_current);
    assert_eq!(opened.start_date, new_start);
    assert_eq!(opened.reason, AssignmentReason::Transfer);

    // Exactly one current assignment at any instant.
    assert_eq!(app.assignment_repo.count_current(staff.id).await.unwrap(), 1);

    let history = app
        .assignments
        .history(staff.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.items.len(), 2);

    // History is ordered by start date ascending; the closed record ends
    // the day before the new one starts.
    let closed = &history.items[0];
    assert_eq!(closed.start_date, past_date());
    assert_eq!(closed.end_date, Some(date(2021, 6, 30)));
    assert!(!closed.is_current);
    assert_eq!(history.items[1].id, opened.id);

    // The staff row's pointer fields follow the new assignment.
    let staff_now = app.staff.get(staff.id).await.unwrap();
    assert_eq!(staff_now.department_id, app.seed.other_department_id);
    assert_eq!(staff_now.rank_id, app.seed.senior_rank_id);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_reassign_with_equal_start_date_fails_and_history_unchanged() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let err = app
        .assignments
        .reassign(&app.ctx(), staff.id, transfer(&app, past_date()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let history = app
        .assignments
        .history(staff.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.items.len(), 1);
    assert!(history.items[0].is_current);
    assert!(history.items[0].end_date.is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_reassign_with_earlier_start_date_fails() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let err = app
        .assignments
        .reassign(&app.ctx(), staff.id, transfer(&app, date(2019, 12, 1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_hire_reason_is_reserved() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let mut req = transfer(&app, date(2021, 7, 1));
    req.reason = AssignmentReason::Hire;
    let err = app
        .assignments
        .reassign(&app.ctx(), staff.id, req)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_terminated_staff_cannot_be_reassigned() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    app.staff
        .change_status(&app.ctx(), staff.id, EmploymentStatus::Terminated, future_date(1))
        .await
        .unwrap();

    let err = app
        .assignments
        .reassign(&app.ctx(), staff.id, transfer(&app, future_date(10)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_reassign_writes_one_audit_entry_for_the_new_record() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let opened = app
        .assignments
        .reassign(&app.ctx(), staff.id, transfer(&app, date(2021, 7, 1)))
        .await
        .unwrap();

    let entries = app
        .audit_repo
        .find_for_record("staff_assignments", opened.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.actor_id, app.actor_id);
    let old = entry.old_values.as_ref().unwrap();
    assert!(old.get("previous_assignment").is_some());
    let new = entry.new_values.as_ref().unwrap();
    assert!(new.get("assignment").is_some());
    assert!(new.get("closed_assignment").is_some());
    assert!(new.get("staff").is_some());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_history_pages_restart_cleanly() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    // Three reassignments, a month apart.
    for (i, month) in [3u32, 4, 5].into_iter().enumerate() {
        let mut req = transfer(&app, date(2021, month, 1));
        req.reason = if i % 2 == 0 {
            AssignmentReason::Transfer
        } else {
            AssignmentReason::Promotion
        };
        app.assignments
            .reassign(&app.ctx(), staff.id, req)
            .await
            .unwrap();
    }

    let first = app
        .assignments
        .history(staff.id, &PageRequest::new(1, 2))
        .await
        .unwrap();
    let second = app
        .assignments
        .history(staff.id, &PageRequest::new(2, 2))
        .await
        .unwrap();

    assert_eq!(first.total_items, 4);
    assert_eq!(first.items.len(), 2);
    assert_eq!(second.items.len(), 2);

    let mut starts: Vec<_> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|a| a.start_date)
        .collect();
    let sorted = {
        let mut s = starts.clone();
        s.sort();
        s
    };
    assert_eq!(starts, sorted);
    starts.dedup();
    assert_eq!(starts.len(), 4);
}
