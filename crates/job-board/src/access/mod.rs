//! Role and ownership checks gating every board operation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::accounts::{Actor, Role, User};
use crate::applications::Application;
use crate::jobs::Job;

/// Operations subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewJob,
    CreateJob,
    EditJob,
    ListOwnJobs,
    ApplyToJob,
    ListOwnApplications,
    ViewApplicants,
    ChangeStatus,
    DownloadResume,
    EmployerDashboard,
    ApplicantDashboard,
}

impl Action {
    /// Roles allowed through the role gate, or `None` when the action is not role gated.
    const fn required_role(self) -> Option<Role> {
        match self {
            Action::CreateJob
            | Action::EditJob
            | Action::ListOwnJobs
            | Action::ViewApplicants
            | Action::ChangeStatus
            | Action::EmployerDashboard => Some(Role::Employer),
            Action::ApplyToJob | Action::ListOwnApplications | Action::ApplicantDashboard => {
                Some(Role::Applicant)
            }
            Action::ViewJob | Action::DownloadResume => None,
        }
    }
}

/// Target of an action.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    None,
    Job(&'a Job),
    Application {
        application: &'a Application,
        job: &'a Job,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(AccessDenial),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), AccessDenial> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(denial) => Err(denial),
        }
    }
}

/// Terminal denial. Only `LoginRequired` is answered with a redirect instead of forbidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AccessDenial {
    #[error("Login required.")]
    LoginRequired,
    #[error("Account disabled by admin.")]
    AccountDisabled,
    #[error("Insufficient permissions for this page.")]
    InsufficientRole { required: Role },
    #[error("This job is closed or expired.")]
    JobUnavailable,
    #[error("{}", not_owner_message(.action))]
    NotOwner { action: Action },
    #[error("{action:?} requires a target resource.")]
    MissingResource { action: Action },
}

fn not_owner_message(action: &Action) -> &'static str {
    match action {
        Action::EditJob => "You cannot edit another employer's job.",
        Action::ViewApplicants => "You cannot view applicants for another employer's job.",
        Action::ChangeStatus => "You cannot update this application.",
        Action::DownloadResume => "You are not allowed to download this resume.",
        _ => "You do not own this resource.",
    }
}

/// Stateless capability checks evaluated per action.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        resource: Resource<'_>,
        today: NaiveDate,
    ) -> AccessDecision {
        log_decision(actor, action, self.evaluate(actor, action, resource, today))
    }

    /// Checks that need no target resource: authentication, the disabled flag and
    /// the role gate. Run before loading the target so unknown ids are not revealed
    /// to actors who could never act on them.
    pub fn gate(&self, actor: &Actor, action: Action) -> AccessDecision {
        log_decision(actor, action, gate(actor, action).map(|_| ()))
    }

    fn evaluate(
        &self,
        actor: &Actor,
        action: Action,
        resource: Resource<'_>,
        today: NaiveDate,
    ) -> Result<(), AccessDenial> {
        let user = gate(actor, action)?;

        match action {
            Action::ViewJob => {
                let job = target_job(action, resource)?;
                if job.is_active(today) {
                    return Ok(());
                }
                match user {
                    Some(user) if user.is_superuser() || job.is_owned_by(user) => Ok(()),
                    _ => Err(AccessDenial::JobUnavailable),
                }
            }
            Action::DownloadResume => {
                let user = user.ok_or(AccessDenial::LoginRequired)?;
                let Resource::Application { application, job } = resource else {
                    return Err(AccessDenial::MissingResource { action });
                };
                if user.is_superuser() || application.applicant == user.id || job.is_owned_by(user)
                {
                    Ok(())
                } else {
                    Err(AccessDenial::NotOwner { action })
                }
            }
            Action::CreateJob
            | Action::ListOwnJobs
            | Action::ApplyToJob
            | Action::ListOwnApplications
            | Action::EmployerDashboard
            | Action::ApplicantDashboard => Ok(()),
            Action::EditJob | Action::ViewApplicants | Action::ChangeStatus => {
                let user = user.ok_or(AccessDenial::LoginRequired)?;
                let job = target_job(action, resource)?;
                owner_or_superuser(user, job, action)
            }
        }
    }
}

fn log_decision(
    actor: &Actor,
    action: Action,
    outcome: Result<(), AccessDenial>,
) -> AccessDecision {
    match outcome {
        Ok(()) => AccessDecision::Allow,
        Err(denial) => {
            tracing::debug!(
                ?action,
                actor = actor.user().map(|user| user.id.0.as_str()).unwrap_or("anonymous"),
                %denial,
                "access denied"
            );
            AccessDecision::Deny(denial)
        }
    }
}

/// Disabled accounts are refused outright. Job detail stays open to anonymous
/// visitors; resume download only needs a login; everything else goes through the
/// role gate.
fn gate(actor: &Actor, action: Action) -> Result<Option<&User>, AccessDenial> {
    if let Some(user) = actor.user() {
        if user.disabled {
            return Err(AccessDenial::AccountDisabled);
        }
    }

    match action {
        Action::ViewJob => Ok(actor.user()),
        Action::DownloadResume => actor.user().map(Some).ok_or(AccessDenial::LoginRequired),
        _ => role_gate(actor, action).map(Some),
    }
}

/// Authentication, then role. Superusers pass any role.
fn role_gate(actor: &Actor, action: Action) -> Result<&User, AccessDenial> {
    let user = actor.user().ok_or(AccessDenial::LoginRequired)?;
    if user.is_superuser() {
        return Ok(user);
    }
    match action.required_role() {
        Some(required) if user.role != required => {
            Err(AccessDenial::InsufficientRole { required })
        }
        _ => Ok(user),
    }
}

fn target_job<'a>(action: Action, resource: Resource<'a>) -> Result<&'a Job, AccessDenial> {
    match resource {
        Resource::Job(job) | Resource::Application { job, .. } => Ok(job),
        Resource::None => Err(AccessDenial::MissingResource { action }),
    }
}

fn owner_or_superuser(user: &User, job: &Job, action: Action) -> Result<(), AccessDenial> {
    if user.is_superuser() || job.is_owned_by(user) {
        Ok(())
    } else {
        Err(AccessDenial::NotOwner { action })
    }
}
