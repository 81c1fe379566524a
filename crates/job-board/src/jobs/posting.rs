use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Job, JobId, JobType};
use crate::accounts::UserId;
use crate::validation::ValidationErrors;

/// Employer-supplied posting fields for create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    #[serde(default)]
    pub company_name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
    #[serde(default)]
    pub skills: String,
    #[serde(default = "default_open")]
    pub is_open: bool,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

fn default_open() -> bool {
    true
}

/// Draft that passed validation; skills are normalized to `"a, b, c"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidJobDraft {
    draft: JobDraft,
    deadline: NaiveDate,
}

impl JobDraft {
    pub fn validate(mut self, today: NaiveDate) -> Result<ValidJobDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            errors.add("title", "Title is required.");
        } else if self.title.chars().count() > 200 {
            errors.add("title", "Title must be at most 200 characters.");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required.");
        }

        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                errors.add(
                    "salary_max",
                    "Max salary must be greater than or equal to min salary.",
                );
            }
        }

        let deadline = match self.deadline {
            None => {
                errors.add("deadline", "Deadline is required.");
                None
            }
            Some(deadline) if deadline < today => {
                errors.add("deadline", "Deadline must be today or a future date.");
                None
            }
            Some(deadline) => Some(deadline),
        };

        self.skills = self
            .skills
            .split(',')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        match deadline {
            Some(deadline) if errors.is_empty() => Ok(ValidJobDraft {
                draft: self,
                deadline,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidJobDraft {
    pub fn skills(&self) -> &str {
        &self.draft.skills
    }

    /// New posting owned by `employer`, whatever the payload claimed.
    pub fn into_job(self, id: JobId, employer: UserId, now: DateTime<Utc>) -> Job {
        let JobDraft {
            company_name,
            title,
            description,
            location,
            job_type,
            salary_min,
            salary_max,
            skills,
            is_open,
            ..
        } = self.draft;

        Job {
            id,
            employer,
            company_name,
            title,
            description,
            location,
            job_type,
            salary_min,
            salary_max,
            skills,
            is_open,
            deadline: self.deadline,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields of an existing posting. Ownership is untouched.
    pub fn apply_to(self, job: &mut Job, now: DateTime<Utc>) {
        let JobDraft {
            company_name,
            title,
            description,
            location,
            job_type,
            salary_min,
            salary_max,
            skills,
            is_open,
            ..
        } = self.draft;

        job.company_name = company_name;
        job.title = title;
        job.description = description;
        job.location = location;
        job.job_type = job_type;
        job.salary_min = salary_min;
        job.salary_max = salary_max;
        job.skills = skills;
        job.is_open = is_open;
        job.deadline = self.deadline;
        job.updated_at = now;
    }
}
