//! Integration tests for the qualification tracker.

mod common;

use staffhub::core::error::ErrorKind;
use staffhub::core::types::pagination::PageRequest;
use staffhub::entity::qualification::VerificationStatus;
use staffhub::service::RecordQualificationRequest;

use common::{date, past_date, short_tag, TestApp};

fn record_request(
    staff_id: uuid::Uuid,
    type_id: uuid::Uuid,
    name: &str,
    expiry: Option<chrono::NaiveDate>,
) -> RecordQualificationRequest {
    RecordQualificationRequest {
        staff_id,
        qualification_type_id: type_id,
        name: name.to_string(),
        issue_date: date(2023, 1, 10),
        expiry_date: expiry,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_record_and_verify() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let name = format!("CERT-{}", short_tag());

    let qualification = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(
                staff.id,
                app.seed.qualification_type_id,
                &name,
                Some(date(2026, 1, 10)),
            ),
        )
        .await
        .unwrap();
    assert_eq!(qualification.verification_status, VerificationStatus::Pending);

    let verified = app
        .qualifications
        .verify(
            &app.ctx(),
            qualification.id,
            VerificationStatus::Verified,
            Some("checked against issuer registry".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(verified.verification_status, VerificationStatus::Verified);
    assert_eq!(verified.verifier_id, Some(app.actor_id));
    assert!(verified.verified_at.is_some());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_active_qualification_conflicts() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let name = format!("CERT-{}", short_tag());

    app.qualifications
        .record(
            &app.ctx(),
            record_request(staff.id, app.seed.qualification_type_id, &name, None),
        )
        .await
        .unwrap();

    let err = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(staff.id, app.seed.qualification_type_id, &name, None),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_revoked_record_can_be_recorded_again() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let name = format!("CERT-{}", short_tag());

    let first = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(staff.id, app.seed.qualification_type_id, &name, None),
        )
        .await
        .unwrap();
    app.qualifications
        .verify(
            &app.ctx(),
            first.id,
            VerificationStatus::Revoked,
            Some("issuer could not confirm".to_string()),
        )
        .await
        .unwrap();

    // Same (staff, type, name) is recordable once the old record is revoked.
    app.qualifications
        .record(
            &app.ctx(),
            record_request(staff.id, app.seed.qualification_type_id, &name, None),
        )
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_revoked_record_cannot_be_reverified() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let name = format!("CERT-{}", short_tag());

    let qualification = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(staff.id, app.seed.qualification_type_id, &name, None),
        )
        .await
        .unwrap();
    app.qualifications
        .verify(&app.ctx(), qualification.id, VerificationStatus::Revoked, None)
        .await
        .unwrap();

    let err = app
        .qualifications
        .verify(&app.ctx(), qualification.id, VerificationStatus::Verified, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

/// Scan every page of the expiry alerts for one record id.
async fn alert_listed(
    app: &TestApp,
    today: chrono::NaiveDate,
    days: i64,
    id: uuid::Uuid,
) -> bool {
    let mut page_no = 1;
    loop {
        let page = PageRequest::new(page_no, 200);
        let alerts = app
            .qualifications
            .expiring_within(today, days, &page)
            .await
            .unwrap();
        if alerts.items.iter().any(|q| q.id == id) {
            return true;
        }
        if !alerts.has_next {
            return false;
        }
        page_no += 1;
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_expiring_within_uses_caller_supplied_now() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;
    let name = format!("CERT-{}", short_tag());

    let qualification = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(
                staff.id,
                app.seed.qualification_type_id,
                &name,
                Some(date(2026, 1, 10)),
            ),
        )
        .await
        .unwrap();

    // Unverified records never alert.
    assert!(!alert_listed(&app, date(2025, 12, 20), 30, qualification.id).await);

    app.qualifications
        .verify(&app.ctx(), qualification.id, VerificationStatus::Verified, None)
        .await
        .unwrap();

    // Inside the window, as seen from 2025-12-20.
    assert!(alert_listed(&app, date(2025, 12, 20), 30, qualification.id).await);

    // Outside the window.
    assert!(!alert_listed(&app, date(2025, 10, 1), 30, qualification.id).await);

    // Already expired records are not "expiring".
    assert!(!alert_listed(&app, date(2026, 2, 1), 30, qualification.id).await);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_expiry_must_follow_issue() {
    let app = TestApp::new().await;
    let staff = app.hire_staff(past_date()).await;

    let err = app
        .qualifications
        .record(
            &app.ctx(),
            record_request(
                staff.id,
                app.seed.qualification_type_id,
                &format!("CERT-{}", short_tag()),
                Some(date(2022, 1, 1)),
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
