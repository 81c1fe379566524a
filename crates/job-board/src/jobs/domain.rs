use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{split_skills, User, UserId};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Contract,
    Remote,
    Hybrid,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "Full Time",
            JobType::PartTime => "Part Time",
            JobType::Internship => "Internship",
            JobType::Contract => "Contract",
            JobType::Remote => "Remote",
            JobType::Hybrid => "Hybrid",
        }
    }
}

/// A posting owned by exactly one employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer: UserId,
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub skills: String,
    pub is_open: bool,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Open and not past its deadline. The deadline day itself still counts.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.is_open && self.deadline >= today
    }

    pub fn is_owned_by(&self, user: &User) -> bool {
        self.employer == user.id
    }

    pub fn skills_list(&self) -> Vec<String> {
        split_skills(&self.skills)
    }

    /// Company shown on listings, falling back to the employer's profile.
    pub fn display_company(&self, employer: Option<&User>) -> String {
        if !self.company_name.trim().is_empty() {
            return self.company_name.clone();
        }
        employer
            .map(|user| {
                user.company
                    .clone()
                    .filter(|company| !company.trim().is_empty())
                    .unwrap_or_else(|| user.username.clone())
            })
            .unwrap_or_default()
    }
}
