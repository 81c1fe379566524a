//! Integration specifications for the hiring workflow.
//!
//! Scenarios drive the public rule components and the HTTP router end to end, so
//! eligibility, lifecycle and access rules are checked the way callers see them.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use job_board::accounts::{Role, User, UserId};
    use job_board::applications::{ResumeUpload, PDF_SIGNATURE};
    use job_board::board::{AccountRepository, BoardService, MemoryStore};
    use job_board::clock::FixedClock;
    use job_board::config::BoardConfig;
    use job_board::jobs::{Job, JobId, JobType};
    use job_board::notifications::{DeliveryReceipt, Notification, Notifier, NotifyError};

    pub(super) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
    }

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0)
            .single()
            .expect("valid instant")
    }

    pub(super) fn user(name: &str, role: Role) -> User {
        User {
            id: UserId(format!("usr-{name}")),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            role,
            superuser: false,
            disabled: false,
            company: None,
            summary: String::new(),
            skills: String::new(),
        }
    }

    pub(super) fn job(owner: &User, deadline: NaiveDate) -> Job {
        Job {
            id: JobId("job-j".to_string()),
            employer: owner.id.clone(),
            company_name: "Acme".to_string(),
            title: "Data Engineer".to_string(),
            description: "Pipelines.".to_string(),
            location: "Lisbon".to_string(),
            job_type: JobType::FullTime,
            salary_min: None,
            salary_max: None,
            skills: "python, sql".to_string(),
            is_open: true,
            deadline,
            created_at: now(),
            updated_at: now(),
        }
    }

    pub(super) fn pdf() -> ResumeUpload {
        let mut bytes = PDF_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"1.4 body");
        ResumeUpload::new("resume.pdf", Some("application/pdf".to_string()), bytes)
    }

    /// Accepts everything and keeps nothing.
    pub(super) struct Outbox;

    impl Notifier for Outbox {
        fn notify(&self, notification: &Notification) -> Result<DeliveryReceipt, NotifyError> {
            Ok(DeliveryReceipt {
                accepted: notification.recipients.len(),
            })
        }
    }

    pub(super) fn board() -> (Arc<BoardService<MemoryStore, Outbox>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (name, role) in [
            ("acme", Role::Employer),
            ("globex", Role::Employer),
            ("ana", Role::Applicant),
        ] {
            let mut account = user(name, role);
            if role == Role::Employer {
                account.company = Some(format!("{name} Inc"));
            }
            store.insert_user(account).expect("seed account");
        }
        let service = BoardService::with_clock(
            store.clone(),
            Arc::new(Outbox),
            BoardConfig::default(),
            Arc::new(FixedClock::on(today())),
        );
        (Arc::new(service), store)
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use job_board::access::{AccessDecision, AccessDenial, AccessPolicy, Action, Resource};
use job_board::accounts::{Actor, Role};
use job_board::applications::{
    ApplicationId, ApplicationLifecycle, ApplicationStatus, EligibilityChecker, EligibilityError,
    LifecycleError, ResumeRejection, ResumeUpload,
};
use job_board::board::{board_router, FILE_NAME_HEADER, USER_HEADER};
use job_board::config::{ResumePolicy, TransitionMode};

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}

#[test]
fn deadline_yesterday_closes_an_open_job() {
    let employer = user("acme", Role::Employer);
    let applicant = user("ana", Role::Applicant);
    let yesterday = today().pred_opt().expect("valid");
    let job = job(&employer, yesterday);

    let outcome = EligibilityChecker::new(ResumePolicy::default()).check_eligibility(
        &job,
        &applicant,
        None,
        &pdf(),
        today(),
    );

    assert!(matches!(outcome, Err(EligibilityError::JobClosed { .. })));
}

#[test]
fn deadline_today_still_accepts() {
    let employer = user("acme", Role::Employer);
    let applicant = user("ana", Role::Applicant);
    let job = job(&employer, today());

    let accepted = EligibilityChecker::new(ResumePolicy::default())
        .check_eligibility(&job, &applicant, None, &pdf(), today())
        .expect("eligible");

    let application = accepted.into_application(
        ApplicationId("app-x".to_string()),
        "resumes/2025/03/app-x.pdf".to_string(),
        String::new(),
        now(),
    );
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.resume.file_name, "resume.pdf");
}

#[test]
fn signature_check_ignores_declared_content_type() {
    let employer = user("acme", Role::Employer);
    let applicant = user("ana", Role::Applicant);
    let job = job(&employer, today());
    let checker = EligibilityChecker::new(ResumePolicy::default());

    for declared in [Some("application/pdf"), None] {
        let upload = ResumeUpload::new(
            "resume.pdf",
            declared.map(str::to_string),
            b"PK\x03\x04 zip".to_vec(),
        );
        let outcome = checker.check_eligibility(&job, &applicant, None, &upload, today());
        assert_eq!(
            outcome,
            Err(EligibilityError::InvalidResume(ResumeRejection::BadSignature))
        );
    }
}

#[test]
fn disabled_accounts_are_denied_matching_actions() {
    let employer = user("acme", Role::Employer);
    let mut applicant = user("ana", Role::Applicant);
    applicant.disabled = true;
    let job = job(&employer, today());

    let decision = AccessPolicy::new().authorize(
        &Actor::User(applicant),
        Action::ApplyToJob,
        Resource::Job(&job),
        today(),
    );

    assert_eq!(
        decision,
        AccessDecision::Deny(AccessDenial::AccountDisabled)
    );
}

#[test]
fn lifecycle_refuses_other_employers() {
    let owner = user("acme", Role::Employer);
    let rival = user("globex", Role::Employer);
    let applicant = user("ana", Role::Applicant);
    let job = job(&owner, today());
    let application = EligibilityChecker::new(ResumePolicy::default())
        .check_eligibility(&job, &applicant, None, &pdf(), today())
        .expect("eligible")
        .into_application(
            ApplicationId("app-1".to_string()),
            "resumes/2025/03/app-1.pdf".to_string(),
            String::new(),
            now(),
        );

    let lifecycle = ApplicationLifecycle::new(TransitionMode::Permissive, AccessPolicy::new());
    let outcome = lifecycle.change_status(
        &application,
        &job,
        ApplicationStatus::Rejected,
        &Actor::User(rival),
        now(),
    );
    assert!(matches!(outcome, Err(LifecycleError::Forbidden(_))));

    let change = lifecycle
        .change_status(
            &application,
            &job,
            ApplicationStatus::Rejected,
            &Actor::User(owner),
            now(),
        )
        .expect("owner may reject");
    assert!(change.changed);
    assert_eq!(change.previous, ApplicationStatus::Applied);
}

#[tokio::test]
async fn apply_twice_over_http_keeps_one_application() {
    let (service, store) = board();
    let employer = service.resolve_actor(Some("usr-acme")).expect("employer");
    let job = service
        .create_job(
            &employer,
            serde_json::from_value(json!({
                "title": "Data Engineer",
                "description": "Pipelines.",
                "skills": "Python,SQL",
                "deadline": "2025-04-01"
            }))
            .expect("draft"),
        )
        .expect("job");
    let router = board_router(service.clone());

    let submit = || {
        Request::post(format!("/api/v1/jobs/{}/applications", job.id))
            .header(USER_HEADER, "usr-ana")
            .header(header::CONTENT_TYPE, "application/pdf")
            .header(FILE_NAME_HEADER, "resume.pdf")
            .body(Body::from(pdf().bytes))
            .expect("request")
    };

    let first = router.clone().oneshot(submit()).await.expect("response");
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = router.clone().oneshot(submit()).await.expect("response");
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(store.application_count(), 1);

    let mine = router
        .oneshot(
            Request::get("/api/v1/applications/mine")
                .header(USER_HEADER, "usr-ana")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let body = json_body(mine).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["status"], json!("applied"));
}

#[tokio::test]
async fn rival_employer_cannot_touch_status_over_http() {
    let (service, _store) = board();
    let employer = service.resolve_actor(Some("usr-acme")).expect("employer");
    let applicant = service.resolve_actor(Some("usr-ana")).expect("applicant");
    let job = service
        .create_job(
            &employer,
            serde_json::from_value(json!({
                "title": "Data Engineer",
                "description": "Pipelines.",
                "deadline": "2025-04-01"
            }))
            .expect("draft"),
        )
        .expect("job");
    let application = service
        .apply(&applicant, &job.id, pdf(), String::new())
        .expect("applied");
    let router = board_router(Arc::clone(&service));

    let response = router
        .oneshot(
            Request::post(format!("/api/v1/applications/{}/status", application.id))
                .header(USER_HEADER, "usr-globex")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"hired"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], json!("You cannot update this application."));
    assert_eq!(
        service.my_applications(&applicant).expect("mine")[0].status,
        ApplicationStatus::Applied
    );
}
