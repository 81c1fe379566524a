use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus, ResumeRef};
use super::resume::{self, ResumeBlob, ResumeRejection};
use crate::accounts::{User, UserId};
use crate::config::ResumePolicy;
use crate::jobs::{Job, JobId};

/// Reasons an applicant may not submit to a job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("This job is closed or expired.")]
    JobClosed { job: JobId },
    /// Informational: the earlier application stands and nothing new is stored.
    #[error("You already applied to this job.")]
    DuplicateApplication { existing: ApplicationId },
    #[error(transparent)]
    InvalidResume(#[from] ResumeRejection),
}

/// Application that passed every eligibility check and awaits storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job: JobId,
    pub applicant: UserId,
    pub file_name: String,
    pub size: u64,
}

impl NewApplication {
    pub fn into_application(
        self,
        id: ApplicationId,
        storage_key: String,
        cover_letter: String,
        now: DateTime<Utc>,
    ) -> Application {
        Application {
            id,
            job: self.job,
            applicant: self.applicant,
            resume: ResumeRef {
                storage_key,
                file_name: self.file_name,
                size: self.size,
            },
            cover_letter,
            status: ApplicationStatus::Applied,
            applied_at: now,
            updated_at: now,
        }
    }
}

/// Decides whether an applicant may submit an application to a posting.
#[derive(Debug, Clone, Default)]
pub struct EligibilityChecker {
    resume: ResumePolicy,
}

impl EligibilityChecker {
    pub fn new(resume: ResumePolicy) -> Self {
        Self { resume }
    }

    /// Checks run in order and stop at the first failure: job active, no prior
    /// application for the pair, resume valid.
    pub fn check_eligibility<B>(
        &self,
        job: &Job,
        applicant: &User,
        existing: Option<&Application>,
        resume: &B,
        today: NaiveDate,
    ) -> Result<NewApplication, EligibilityError>
    where
        B: ResumeBlob + ?Sized,
    {
        if !job.is_active(today) {
            return Err(EligibilityError::JobClosed {
                job: job.id.clone(),
            });
        }

        if let Some(existing) = existing.filter(|application| {
            application.job == job.id && application.applicant == applicant.id
        }) {
            return Err(EligibilityError::DuplicateApplication {
                existing: existing.id.clone(),
            });
        }

        resume::inspect(resume, &self.resume)?;

        Ok(NewApplication {
            job: job.id.clone(),
            applicant: applicant.id.clone(),
            file_name: resume.file_name().to_string(),
            size: resume.size(),
        })
    }
}
