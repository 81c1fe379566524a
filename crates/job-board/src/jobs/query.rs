use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Job, JobType};
use crate::accounts::split_skills;

/// Substring filters for the public job listing. Blank fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub skills: Option<String>,
}

impl JobQuery {
    /// Only active jobs are ever listed.
    pub fn matches(&self, job: &Job, today: NaiveDate) -> bool {
        if !job.is_active(today) {
            return false;
        }

        if let Some(needle) = lowered(self.q.as_deref()) {
            if !contains(&job.title, &needle) && !contains(&job.description, &needle) {
                return false;
            }
        }

        if let Some(needle) = lowered(self.location.as_deref()) {
            if !contains(&job.location, &needle) {
                return false;
            }
        }

        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }

        if let Some(raw) = self.skills.as_deref() {
            if !split_skills(raw)
                .iter()
                .all(|skill| contains(&job.skills, skill))
            {
                return false;
            }
        }

        true
    }
}

fn lowered(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
