use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationStatus};
use crate::access::{AccessDenial, AccessPolicy, Action, Resource};
use crate::accounts::Actor;
use crate::config::TransitionMode;
use crate::jobs::Job;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Forbidden(#[from] AccessDenial),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

/// Result of a status change request. `changed` is false when the status was already set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub application: Application,
    pub previous: ApplicationStatus,
    pub changed: bool,
}

/// Governs who may move an application between statuses and which moves are legal.
#[derive(Debug, Clone)]
pub struct ApplicationLifecycle {
    mode: TransitionMode,
    access: AccessPolicy,
}

impl ApplicationLifecycle {
    pub fn new(mode: TransitionMode, access: AccessPolicy) -> Self {
        Self { mode, access }
    }

    pub fn change_status(
        &self,
        application: &Application,
        job: &Job,
        next: ApplicationStatus,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, LifecycleError> {
        self.access
            .authorize(
                actor,
                Action::ChangeStatus,
                Resource::Application { application, job },
                now.date_naive(),
            )
            .into_result()?;

        let previous = application.status;
        if previous == next {
            return Ok(StatusChange {
                application: application.clone(),
                previous,
                changed: false,
            });
        }

        if self.mode == TransitionMode::Strict && !previous.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        let mut updated = application.clone();
        updated.status = next;
        updated.updated_at = now;

        Ok(StatusChange {
            application: updated,
            previous,
            changed: true,
        })
    }
}
