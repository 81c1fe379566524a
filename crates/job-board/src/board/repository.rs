use crate::accounts::{User, UserId};
use crate::applications::{Application, ApplicationId};
use crate::jobs::{Job, JobId, JobQuery};
use chrono::NaiveDate;

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Active jobs matching `query`, newest first.
    fn open_jobs(&self, query: &JobQuery, today: NaiveDate) -> Result<Vec<Job>, RepositoryError>;
    /// Every job owned by `employer`, newest first.
    fn jobs_by_employer(&self, employer: &UserId) -> Result<Vec<Job>, RepositoryError>;
}

/// Storage abstraction for applications.
///
/// `insert_application` must reject a second row for the same (job, applicant) pair
/// with [`RepositoryError::Conflict`], atomically with the insert.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_application(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Newest first.
    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError>;
    /// Newest first.
    fn applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError>;
}

/// Storage abstraction for accounts. Usernames are unique.
pub trait AccountRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
}

/// Blob storage for uploaded resumes.
pub trait ResumeStore: Send + Sync {
    fn put_resume(&self, key: &str, bytes: Vec<u8>) -> Result<(), RepositoryError>;
    fn get_resume(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError>;
    /// Removing a missing key is not an error.
    fn delete_resume(&self, key: &str) -> Result<(), RepositoryError>;
}

/// Everything the board service persists.
pub trait BoardStore: JobRepository + ApplicationRepository + AccountRepository + ResumeStore {}

impl<T> BoardStore for T where
    T: JobRepository + ApplicationRepository + AccountRepository + ResumeStore
{
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
