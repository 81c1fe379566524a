use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::accounts::{Actor, Role, User, UserId};
use crate::applications::{Application, ApplicationId, ResumeUpload, PDF_SIGNATURE};
use crate::board::repository::{
    AccountRepository, ApplicationRepository, JobRepository, RepositoryError, ResumeStore,
};
use crate::board::{board_router, BoardService, MemoryStore};
use crate::clock::FixedClock;
use crate::config::{BoardConfig, TransitionMode};
use crate::jobs::{Job, JobDraft, JobId, JobQuery, JobType};
use crate::notifications::{DeliveryReceipt, Notification, Notifier, NotifyError};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn user(id: &str, role: Role) -> User {
    User {
        id: UserId(format!("usr-{id}")),
        username: id.to_string(),
        email: format!("{id}@example.com"),
        role,
        superuser: role == Role::Admin,
        disabled: false,
        company: (role == Role::Employer).then(|| format!("{id} Ltd")),
        summary: String::new(),
        skills: String::new(),
    }
}

pub(super) struct Fixture {
    pub(super) service: BoardService<MemoryStore, MemoryNotifier>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) notifier: Arc<MemoryNotifier>,
    pub(super) employer: Actor,
    pub(super) rival: Actor,
    pub(super) applicant: Actor,
    pub(super) admin: Actor,
}

pub(super) fn fixture() -> Fixture {
    fixture_with(BoardConfig::default())
}

pub(super) fn strict_fixture() -> Fixture {
    fixture_with(BoardConfig {
        transitions: TransitionMode::Strict,
        ..BoardConfig::default()
    })
}

pub(super) fn fixture_with(config: BoardConfig) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = BoardService::with_clock(
        store.clone(),
        notifier.clone(),
        config,
        Arc::new(FixedClock::on(today())),
    );

    let seed = |id: &str, role: Role| -> Actor {
        store
            .insert_user(user(id, role))
            .expect("seed user")
            .into()
    };
    let employer = seed("acme", Role::Employer);
    let rival = seed("globex", Role::Employer);
    let applicant = seed("ana", Role::Applicant);
    let admin = seed("root", Role::Admin);

    Fixture {
        service,
        store,
        notifier,
        employer,
        rival,
        applicant,
        admin,
    }
}

pub(super) fn draft(title: &str) -> JobDraft {
    JobDraft {
        company_name: String::new(),
        title: title.to_string(),
        description: "Build and run services.".to_string(),
        location: "Remote".to_string(),
        job_type: JobType::FullTime,
        salary_min: Some(50_000),
        salary_max: Some(80_000),
        skills: "Rust, SQL".to_string(),
        is_open: true,
        deadline: NaiveDate::from_ymd_opt(2025, 7, 1),
    }
}

pub(super) fn pdf_resume() -> ResumeUpload {
    let mut bytes = PDF_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"1.7 resume body");
    ResumeUpload::new("cv.pdf", Some("application/pdf".to_string()), bytes)
}

impl Fixture {
    pub(super) fn post_job(&self, title: &str) -> Job {
        self.service
            .create_job(&self.employer, draft(title))
            .expect("job created")
    }

    pub(super) fn apply(&self, job: &Job) -> Application {
        self.service
            .apply(&self.applicant, &job.id, pdf_resume(), "Hire me".to_string())
            .expect("application submitted")
    }

    /// Close a job behind the service's back, the way an expired deadline would.
    pub(super) fn close(&self, job: &Job) {
        let mut closed = job.clone();
        closed.is_open = false;
        self.store.update_job(closed).expect("job updated");
    }

    pub(super) fn router(self) -> axum::Router {
        board_router(Arc::new(self.service))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn subjects(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|notification| notification.subject)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) -> Result<DeliveryReceipt, NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification.clone());
        Ok(DeliveryReceipt {
            accepted: notification.recipients.len(),
        })
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: &Notification) -> Result<DeliveryReceipt, NotifyError> {
        Err(NotifyError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn update_job(&self, _job: Job) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn open_jobs(&self, _query: &JobQuery, _today: NaiveDate) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn jobs_by_employer(&self, _employer: &UserId) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn update_application(&self, _application: Application) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn find_application(
        &self,
        _job: &JobId,
        _applicant: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn applications_for_job(&self, _job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn applications_by_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
}

impl AccountRepository for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }

    fn update_user(&self, _user: User) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }
}

impl ResumeStore for UnavailableStore {
    fn put_resume(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), RepositoryError> {
        offline()
    }

    fn get_resume(&self, _key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        offline()
    }

    fn delete_resume(&self, _key: &str) -> Result<(), RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
