use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::repository::{
    AccountRepository, ApplicationRepository, JobRepository, RepositoryError, ResumeStore,
};
use crate::accounts::{User, UserId};
use crate::applications::{Application, ApplicationId};
use crate::jobs::{Job, JobId, JobQuery};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    // (job, applicant) -> application; the uniqueness constraint.
    application_pairs: HashMap<(JobId, UserId), ApplicationId>,
    resumes: HashMap<String, Vec<u8>>,
}

/// Process-local store backing the API binary and tests. One lock guards every table
/// so the pair check and the insert happen together.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store poisoned".to_string()))
    }

    pub fn application_count(&self) -> usize {
        self.tables()
            .map(|tables| tables.applications.len())
            .unwrap_or_default()
    }

    pub fn resume_count(&self) -> usize {
        self.tables()
            .map(|tables| tables.resumes.len())
            .unwrap_or_default()
    }
}

fn newest_jobs_first(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    jobs
}

fn newest_applications_first(mut applications: Vec<Application>) -> Vec<Application> {
    applications.sort_by(|a, b| {
        b.applied_at
            .cmp(&a.applied_at)
            .then(b.id.cmp(&a.id))
    });
    applications
}

impl JobRepository for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.tables()?.jobs.get(id).cloned())
    }

    fn open_jobs(&self, query: &JobQuery, today: NaiveDate) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.tables()?;
        let jobs = tables
            .jobs
            .values()
            .filter(|job| query.matches(job, today))
            .cloned()
            .collect();
        Ok(newest_jobs_first(jobs))
    }

    fn jobs_by_employer(&self, employer: &UserId) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.tables()?;
        let jobs = tables
            .jobs
            .values()
            .filter(|job| &job.employer == employer)
            .cloned()
            .collect();
        Ok(newest_jobs_first(jobs))
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables()?;
        let pair = (application.job.clone(), application.applicant.clone());
        if tables.application_pairs.contains_key(&pair)
            || tables.applications.contains_key(&application.id)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.application_pairs.insert(pair, application.id.clone());
        tables
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.applications.get_mut(&application.id) {
            Some(slot)
                if slot.job == application.job && slot.applicant == application.applicant =>
            {
                *slot = application;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.tables()?.applications.get(id).cloned())
    }

    fn find_application(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .application_pairs
            .get(&(job.clone(), applicant.clone()))
            .and_then(|id| tables.applications.get(id))
            .cloned())
    }

    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables()?;
        let applications = tables
            .applications
            .values()
            .filter(|application| &application.job == job)
            .cloned()
            .collect();
        Ok(newest_applications_first(applications))
    }

    fn applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables()?;
        let applications = tables
            .applications
            .values()
            .filter(|application| &application.applicant == applicant)
            .cloned()
            .collect();
        Ok(newest_applications_first(applications))
    }
}

impl AccountRepository for MemoryStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        let taken = tables.users.contains_key(&user.id)
            || tables
                .users
                .values()
                .any(|existing| existing.username.eq_ignore_ascii_case(&user.username));
        if taken {
            return Err(RepositoryError::Conflict);
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables()?.users.get(id).cloned())
    }
}

impl ResumeStore for MemoryStore {
    fn put_resume(&self, key: &str, bytes: Vec<u8>) -> Result<(), RepositoryError> {
        self.tables()?.resumes.insert(key.to_string(), bytes);
        Ok(())
    }

    fn get_resume(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(self.tables()?.resumes.get(key).cloned())
    }

    fn delete_resume(&self, key: &str) -> Result<(), RepositoryError> {
        self.tables()?.resumes.remove(key);
        Ok(())
    }
}
