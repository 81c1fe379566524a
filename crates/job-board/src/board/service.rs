use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;

use super::repository::{BoardStore, RepositoryError};
use crate::access::{AccessDenial, AccessPolicy, Action, Resource};
use crate::accounts::{landing_path, Actor, SignupRequest, SignupValidator, User, UserId};
use crate::applications::{
    Application, ApplicationId, ApplicationLifecycle, ApplicationStatus, ApplicationStatusView,
    EligibilityChecker, EligibilityError, LifecycleError, ResumeRejection, ResumeUpload,
};
use crate::clock::{Clock, SystemClock};
use crate::config::BoardConfig;
use crate::jobs::{Job, JobDraft, JobId, JobQuery};
use crate::notifications::{dispatch, messages, Delivery, Notifier};
use crate::validation::ValidationErrors;

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

/// Error raised by the board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("This job is closed or expired.")]
    JobClosed { job: JobId },
    #[error("You already applied to this job.")]
    DuplicateApplication { existing: ApplicationId },
    #[error(transparent)]
    InvalidResume(ResumeRejection),
    #[error(transparent)]
    Forbidden(AccessDenial),
    #[error("Login required.")]
    LoginRequired,
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<AccessDenial> for BoardError {
    fn from(denial: AccessDenial) -> Self {
        match denial {
            AccessDenial::LoginRequired => BoardError::LoginRequired,
            other => BoardError::Forbidden(other),
        }
    }
}

impl From<EligibilityError> for BoardError {
    fn from(error: EligibilityError) -> Self {
        match error {
            EligibilityError::JobClosed { job } => BoardError::JobClosed { job },
            EligibilityError::DuplicateApplication { existing } => {
                BoardError::DuplicateApplication { existing }
            }
            EligibilityError::InvalidResume(rejection) => BoardError::InvalidResume(rejection),
        }
    }
}

impl From<LifecycleError> for BoardError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::Forbidden(denial) => denial.into(),
            LifecycleError::InvalidTransition { from, to } => {
                BoardError::InvalidTransition { from, to }
            }
        }
    }
}

/// Application row joined with the applicant's public details.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantEntry {
    pub application: Application,
    pub username: String,
    pub email: String,
}

/// Resume blob ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboard {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub applications: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantDashboard {
    pub applications: Vec<ApplicationStatusView>,
}

/// Service composing storage, notifications and the eligibility, lifecycle and access rules.
pub struct BoardService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: BoardConfig,
    access: AccessPolicy,
    eligibility: EligibilityChecker,
    lifecycle: ApplicationLifecycle,
    signup: SignupValidator,
}

impl<S, N> BoardService<S, N>
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: BoardConfig) -> Self {
        Self::with_clock(store, notifier, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        notifier: Arc<N>,
        config: BoardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let access = AccessPolicy::new();
        Self {
            eligibility: EligibilityChecker::new(config.resume.clone()),
            lifecycle: ApplicationLifecycle::new(config.transitions, access),
            signup: SignupValidator::new(config.signup.clone()),
            store,
            notifier,
            clock,
            config,
            access,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Map an optional user id (e.g. from a session header) to an actor. Unknown ids
    /// are authentication failures.
    pub fn resolve_actor(&self, user_id: Option<&str>) -> Result<Actor, BoardError> {
        let Some(raw) = user_id.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Actor::Anonymous);
        };
        match self.store.fetch_user(&UserId(raw.to_string()))? {
            Some(user) => Ok(Actor::User(user)),
            None => Err(BoardError::LoginRequired),
        }
    }

    pub fn landing(&self, actor: &Actor) -> &'static str {
        landing_path(actor)
    }

    /// Create an account. The welcome message is best-effort.
    pub fn register(&self, request: SignupRequest) -> Result<User, BoardError> {
        let account = self.signup.validate(&request)?;

        let user = match self.store.insert_user(account.into_user(next_user_id())) {
            Ok(user) => user,
            Err(RepositoryError::Conflict) => {
                let mut errors = ValidationErrors::default();
                errors.add("username", "A user with that username already exists.");
                return Err(errors.into());
            }
            Err(other) => return Err(other.into()),
        };

        tracing::info!(user_id = %user.id, role = %user.role, "account created");
        self.send(messages::welcome(&self.config.from_email, &user));
        Ok(user)
    }

    pub fn employer_dashboard(&self, actor: &Actor) -> Result<EmployerDashboard, BoardError> {
        let user = self.gated_user(actor, Action::EmployerDashboard)?;
        let today = self.clock.today();
        let jobs = self.store.jobs_by_employer(&user.id)?;
        let mut applications = 0;
        for job in &jobs {
            applications += self.store.applications_for_job(&job.id)?.len();
        }
        Ok(EmployerDashboard {
            total_jobs: jobs.len(),
            active_jobs: jobs.iter().filter(|job| job.is_active(today)).count(),
            applications,
        })
    }

    pub fn applicant_dashboard(&self, actor: &Actor) -> Result<ApplicantDashboard, BoardError> {
        let applications = self
            .my_applications_for(actor, Action::ApplicantDashboard)?
            .iter()
            .map(Application::status_view)
            .collect();
        Ok(ApplicantDashboard { applications })
    }

    /// Public listing of active jobs.
    pub fn list_open_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, BoardError> {
        Ok(self.store.open_jobs(query, self.clock.today())?)
    }

    pub fn job_detail(&self, actor: &Actor, job_id: &JobId) -> Result<Job, BoardError> {
        self.access.gate(actor, Action::ViewJob).into_result()?;
        let job = self.load_job(job_id)?;
        self.access
            .authorize(actor, Action::ViewJob, Resource::Job(&job), self.clock.today())
            .into_result()?;
        Ok(job)
    }

    /// Post a new job owned by the acting employer.
    pub fn create_job(&self, actor: &Actor, draft: JobDraft) -> Result<Job, BoardError> {
        let user = self.gated_user(actor, Action::CreateJob)?;
        let valid = draft.validate(self.clock.today())?;
        let job = valid.into_job(next_job_id(), user.id.clone(), self.clock.now());
        let job = self.store.insert_job(job)?;
        tracing::info!(job_id = %job.id, employer = %job.employer, "job created");
        Ok(job)
    }

    pub fn edit_job(
        &self,
        actor: &Actor,
        job_id: &JobId,
        draft: JobDraft,
    ) -> Result<Job, BoardError> {
        self.access.gate(actor, Action::EditJob).into_result()?;
        let mut job = self.load_job(job_id)?;
        self.access
            .authorize(actor, Action::EditJob, Resource::Job(&job), self.clock.today())
            .into_result()?;

        draft
            .validate(self.clock.today())?
            .apply_to(&mut job, self.clock.now());
        self.store.update_job(job.clone())?;
        tracing::info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    pub fn employer_jobs(&self, actor: &Actor) -> Result<Vec<Job>, BoardError> {
        let user = self.gated_user(actor, Action::ListOwnJobs)?;
        Ok(self.store.jobs_by_employer(&user.id)?)
    }

    /// Submit an application. Eligibility failures, including an existing application
    /// for the same job, come back as errors and leave storage untouched.
    pub fn apply(
        &self,
        actor: &Actor,
        job_id: &JobId,
        resume: ResumeUpload,
        cover_letter: String,
    ) -> Result<Application, BoardError> {
        let applicant = self.gated_user(actor, Action::ApplyToJob)?;
        let job = self.load_job(job_id)?;
        let today = self.clock.today();

        let existing = self.store.find_application(&job.id, &applicant.id)?;
        let accepted = self.eligibility.check_eligibility(
            &job,
            applicant,
            existing.as_ref(),
            &resume,
            today,
        )?;

        let now = self.clock.now();
        let id = next_application_id();
        let storage_key = format!("resumes/{}/{:02}/{}.pdf", now.year(), now.month(), id);
        self.store.put_resume(&storage_key, resume.bytes)?;

        let application = accepted.into_application(id, storage_key.clone(), cover_letter, now);
        let application = match self.store.insert_application(application) {
            Ok(application) => application,
            Err(RepositoryError::Conflict) => {
                // Lost a race with a concurrent submission for the same pair.
                self.store.delete_resume(&storage_key)?;
                let existing = self
                    .store
                    .find_application(&job.id, &applicant.id)?
                    .ok_or(RepositoryError::Conflict)?;
                return Err(BoardError::DuplicateApplication {
                    existing: existing.id,
                });
            }
            Err(other) => {
                self.store.delete_resume(&storage_key)?;
                return Err(other.into());
            }
        };

        tracing::info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant = %applicant.id,
            "application submitted"
        );

        match self.store.fetch_user(&job.employer) {
            Ok(Some(employer)) => {
                let [to_employer, to_applicant] = messages::application_submitted(
                    &self.config.from_email,
                    &application,
                    &job,
                    &employer,
                    applicant,
                );
                self.send(to_employer);
                self.send(to_applicant);
            }
            Ok(None) => {
                tracing::warn!(job_id = %job.id, "job owner missing; submission notices skipped")
            }
            Err(error) => {
                tracing::warn!(job_id = %job.id, %error, "submission notices skipped")
            }
        }

        Ok(application)
    }

    pub fn my_applications(&self, actor: &Actor) -> Result<Vec<Application>, BoardError> {
        self.my_applications_for(actor, Action::ListOwnApplications)
    }

    pub fn job_applicants(
        &self,
        actor: &Actor,
        job_id: &JobId,
    ) -> Result<Vec<ApplicantEntry>, BoardError> {
        self.access.gate(actor, Action::ViewApplicants).into_result()?;
        let job = self.load_job(job_id)?;
        self.access
            .authorize(
                actor,
                Action::ViewApplicants,
                Resource::Job(&job),
                self.clock.today(),
            )
            .into_result()?;

        let mut entries = Vec::new();
        for application in self.store.applications_for_job(&job.id)? {
            let applicant = self.store.fetch_user(&application.applicant)?;
            entries.push(ApplicantEntry {
                username: applicant
                    .as_ref()
                    .map(|user| user.username.clone())
                    .unwrap_or_default(),
                email: applicant.map(|user| user.email).unwrap_or_default(),
                application,
            });
        }
        Ok(entries)
    }

    /// Move an application to `status`. The applicant is notified on every real change.
    pub fn change_status(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, BoardError> {
        self.access.gate(actor, Action::ChangeStatus).into_result()?;
        let application = self.load_application(application_id)?;
        let job = self.load_job(&application.job)?;

        let change =
            self.lifecycle
                .change_status(&application, &job, status, actor, self.clock.now())?;
        if !change.changed {
            tracing::debug!(application_id = %application.id, %status, "status unchanged");
            return Ok(change.application);
        }

        self.store.update_application(change.application.clone())?;
        tracing::info!(
            application_id = %application.id,
            from = %change.previous,
            to = %status,
            "application status changed"
        );

        match self.store.fetch_user(&change.application.applicant) {
            Ok(Some(applicant)) => {
                self.send(messages::status_changed(
                    &self.config.from_email,
                    &change.application,
                    &job,
                    &applicant,
                ));
            }
            Ok(None) => tracing::warn!(
                application_id = %application.id,
                "applicant missing; status notice skipped"
            ),
            Err(error) => tracing::warn!(
                application_id = %application.id,
                %error,
                "status notice skipped"
            ),
        }

        Ok(change.application)
    }

    pub fn download_resume(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<ResumeFile, BoardError> {
        self.access.gate(actor, Action::DownloadResume).into_result()?;
        let application = self.load_application(application_id)?;
        let job = self.load_job(&application.job)?;
        self.access
            .authorize(
                actor,
                Action::DownloadResume,
                Resource::Application {
                    application: &application,
                    job: &job,
                },
                self.clock.today(),
            )
            .into_result()?;

        let bytes = self
            .store
            .get_resume(&application.resume.storage_key)?
            .ok_or(BoardError::NotFound("Resume"))?;
        let username = self
            .store
            .fetch_user(&application.applicant)?
            .map(|user| user.username)
            .unwrap_or_else(|| application.applicant.0.clone());

        Ok(ResumeFile {
            file_name: format!("{username}_resume.pdf"),
            bytes,
        })
    }

    fn my_applications_for(
        &self,
        actor: &Actor,
        action: Action,
    ) -> Result<Vec<Application>, BoardError> {
        let user = self.gated_user(actor, action)?;
        Ok(self.store.applications_by_applicant(&user.id)?)
    }

    fn gated_user<'a>(&self, actor: &'a Actor, action: Action) -> Result<&'a User, BoardError> {
        self.access.gate(actor, action).into_result()?;
        actor.user().ok_or(BoardError::LoginRequired)
    }

    fn load_job(&self, id: &JobId) -> Result<Job, BoardError> {
        self.store
            .fetch_job(id)?
            .ok_or(BoardError::NotFound("Job"))
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, BoardError> {
        self.store
            .fetch_application(id)?
            .ok_or(BoardError::NotFound("Application"))
    }

    fn send(&self, notification: crate::notifications::Notification) -> Delivery {
        dispatch(self.notifier.as_ref(), notification)
    }
}
