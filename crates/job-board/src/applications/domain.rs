use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::UserId;
use crate::jobs::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an application.
///
/// `Applied -> UnderReview -> Shortlisted -> {Rejected | Hired}`, with `Withdrawn`
/// reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    UnderReview,
    Shortlisted,
    Rejected,
    Hired,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [Self; 6] = [
        Self::Applied,
        Self::UnderReview,
        Self::Shortlisted,
        Self::Rejected,
        Self::Hired,
        Self::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::UnderReview => "under_review",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
            Self::Hired => "hired",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Human readable form used in notifications.
    pub const fn display(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::UnderReview => "Under Review",
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
            Self::Hired => "Hired",
            Self::Withdrawn => "Withdrawn",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw))
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Hired | Self::Withdrawn)
    }

    /// Edge check against the lifecycle graph.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Self::Withdrawn) => true,
            (Self::Applied, Self::UnderReview) => true,
            (Self::UnderReview, Self::Shortlisted) => true,
            (Self::Shortlisted, Self::Rejected | Self::Hired) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pointer to the stored resume blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRef {
    pub storage_key: String,
    pub file_name: String,
    pub size: u64,
}

/// One applicant's submission to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job: JobId,
    pub applicant: UserId,
    pub resume: ResumeRef,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            job_id: self.job.clone(),
            status: self.status.label(),
            terminal: self.status.is_terminal(),
            updated_at: self.updated_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub status: &'static str,
    pub terminal: bool,
    pub updated_at: DateTime<Utc>,
}
