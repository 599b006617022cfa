//! Integration tests for the leave ledger: balance arithmetic, the
//! application state machine, and policy enforcement.

mod common;

use chrono::Datelike;
use uuid::Uuid;

use staffhub::core::error::ErrorKind;
use staffhub::entity::leave::ApplicationStatus;
use staffhub::service::{FileLeaveRequest, ReviewDecision};

use common::{date, leave_window, past_date, TestApp};

async fn grant(app: &TestApp, staff_id: Uuid, category_id: Uuid, year: i32, allocated: i32) {
    app.leave
        .grant_entitlement(&app.ctx(), staff_id, category_id, year, allocated, 0)
        .await
        .unwrap();
}

fn file_request(
    staff_id: Uuid,
    category_id: Uuid,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> FileLeaveRequest {
    FileLeaveRequest {
        staff_id,
        category_id,
        start_date: start,
        end_date: end,
        reason: Some("personal".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_file_approve_and_reject_scenarios() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (base, _) = leave_window(20);
    let year = base.year();
    grant(&app, staff.id, category, year, 21).await;

    // Consume 5 days first so the entitlement reads allocated=21, used=5.
    let warmup = app
        .leave
        .file_application(
            &app.ctx(),
            file_request(staff.id, category, base, base + chrono::Duration::days(4)),
        )
        .await
        .unwrap();
    assert_eq!(warmup.total_days, 5);
    app.leave
        .review(&app.ctx(), warmup.id, ReviewDecision::Approve, None)
        .await
        .unwrap();

    assert_eq!(app.leave.balance(staff.id, category, year).await.unwrap(), 16);

    // Filing a 3-day request: pending=3, remaining=13.
    let start = base + chrono::Duration::days(10);
    let application = app
        .leave
        .file_application(
            &app.ctx(),
            file_request(staff.id, category, start, start + chrono::Duration::days(2)),
        )
        .await
        .unwrap();
    assert_eq!(application.total_days, 3);
    assert_eq!(application.status, ApplicationStatus::Pending);

    let entitlement = app
        .entitlement_repo
        .find(staff.id, category, year)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entitlement.pending_days, 3);
    assert_eq!(entitlement.used_days, 5);
    assert_eq!(entitlement.remaining(), 13);

    // Approving: used=8, pending=0, remaining=13.
    let approved = app
        .leave
        .review(&app.ctx(), application.id, ReviewDecision::Approve, None)
        .await
        .unwrap();
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(approved.approver_id, Some(app.actor_id));

    let entitlement = app
        .entitlement_repo
        .find(staff.id, category, year)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entitlement.used_days, 8);
    assert_eq!(entitlement.pending_days, 0);
    assert_eq!(entitlement.allocated_days, 21);
    assert_eq!(entitlement.carried_forward_days, 0);
    assert_eq!(entitlement.remaining(), 13);

    // Rejecting a fresh 3-day filing restores remaining to 13 + 0 pending.
    let start = base + chrono::Duration::days(15);
    let rejected_app = app
        .leave
        .file_application(
            &app.ctx(),
            file_request(staff.id, category, start, start + chrono::Duration::days(2)),
        )
        .await
        .unwrap();
    let rejected = app
        .leave
        .review(
            &app.ctx(),
            rejected_app.id,
            ReviewDecision::Reject,
            Some("coverage shortfall".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("coverage shortfall"));

    let entitlement = app
        .entitlement_repo
        .find(staff.id, category, year)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entitlement.pending_days, 0);
    assert_eq!(entitlement.used_days, 8);
    assert_eq!(entitlement.remaining(), 13);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_file_then_cancel_round_trip_restores_pending() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(4);
    let year = start.year();
    grant(&app, staff.id, category, year, 21).await;

    let before = app
        .entitlement_repo
        .find(staff.id, category, year)
        .await
        .unwrap()
        .unwrap();

    let application = app
        .leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap();

    let cancelled = app.leave.cancel(&app.ctx(), application.id).await.unwrap();
    assert_eq!(cancelled.status, ApplicationStatus::Cancelled);

    let after = app
        .entitlement_repo
        .find(staff.id, category, year)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.pending_days, before.pending_days);
    assert_eq!(after.remaining(), before.remaining());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_insufficient_balance_is_a_policy_violation() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(5);
    grant(&app, staff.id, category, start.year(), 2).await;

    let err = app
        .leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolicyViolation);

    // Nothing was reserved.
    let entitlement = app
        .entitlement_repo
        .find(staff.id, category, start.year())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entitlement.pending_days, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_negative_balance_category_allows_overdraft() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.negative_category_id;

    let (start, end) = leave_window(5);
    grant(&app, staff.id, category, start.year(), 2).await;

    app.leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap();

    assert_eq!(
        app.leave.balance(staff.id, category, start.year()).await.unwrap(),
        -3
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_notice_violation() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.strict_category_id;

    // Strict category requires 5 days notice; request starts in 2.
    let start = date(2030, 6, 3); // a Monday
    grant(&app, staff.id, category, 2030, 10).await;

    let ctx = app.ctx_on(date(2030, 6, 1));
    let err = app
        .leave
        .file_application(
            &ctx,
            file_request(staff.id, category, start, date(2030, 6, 4)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolicyViolation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_consecutive_limit_and_business_day_counting() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.strict_category_id;
    grant(&app, staff.id, category, 2030, 10).await;

    let ctx = app.ctx_on(date(2030, 5, 1));

    // Mon..Fri spans 5 business days, over the 3-day consecutive cap.
    let err = app
        .leave
        .file_application(
            &ctx,
            file_request(staff.id, category, date(2030, 6, 3), date(2030, 6, 7)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolicyViolation);

    // Thu..Mon spans a weekend: only 3 business days, within the cap.
    let application = app
        .leave
        .file_application(
            &ctx,
            file_request(staff.id, category, date(2030, 6, 6), date(2030, 6, 10)),
        )
        .await
        .unwrap();
    assert_eq!(application.total_days, 3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_year_boundary_application_rejected() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;
    grant(&app, staff.id, category, 2030, 21).await;

    let err = app
        .leave
        .file_application(
            &app.ctx(),
            file_request(staff.id, category, date(2030, 12, 30), date(2031, 1, 2)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_missing_entitlement_is_not_found() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let (start, end) = leave_window(2);
    let err = app
        .leave
        .file_application(
            &app.ctx(),
            file_request(staff.id, app.seed.annual_category_id, start, end),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_already_decided_application_conflicts() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(2);
    grant(&app, staff.id, category, start.year(), 21).await;

    let application = app
        .leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap();
    app.leave
        .review(&app.ctx(), application.id, ReviewDecision::Approve, None)
        .await
        .unwrap();

    let err = app
        .leave
        .review(&app.ctx(), application.id, ReviewDecision::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app.leave.cancel(&app.ctx(), application.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_rejection_requires_a_reason() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(2);
    grant(&app, staff.id, category, start.year(), 21).await;
    let application = app
        .leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap();

    let err = app
        .leave
        .review(&app.ctx(), application.id, ReviewDecision::Reject, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_entitlement_grant_conflicts() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    grant(&app, staff.id, category, 2030, 21).await;
    let err = app
        .leave
        .grant_entitlement(&app.ctx(), staff.id, category, 2030, 21, 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_leave_summary_reports_derived_remaining() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let category = app.seed.annual_category_id;

    let (start, end) = leave_window(3);
    let year = start.year();
    grant(&app, staff.id, category, year, 21).await;
    app.leave
        .file_application(&app.ctx(), file_request(staff.id, category, start, end))
        .await
        .unwrap();

    let summary = app.reports.leave_summary(staff.id, year).await.unwrap();
    let line = summary
        .iter()
        .find(|l| l.category_id == category)
        .expect("granted category appears in the summary");
    assert_eq!(line.allocated_days, 21);
    assert_eq!(line.pending_days, 3);
    assert_eq!(line.remaining_days, 18);
}
