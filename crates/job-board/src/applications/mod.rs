//! Application intake and lifecycle: eligibility checks, resume validation and
//! status transitions.

pub mod domain;
pub mod eligibility;
pub mod lifecycle;
pub mod resume;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationStatusView, ResumeRef,
};
pub use eligibility::{EligibilityChecker, EligibilityError, NewApplication};
pub use lifecycle::{ApplicationLifecycle, LifecycleError, StatusChange};
pub use resume::{ResumeBlob, ResumeRejection, ResumeUpload, PDF_SIGNATURE};
