//! Job postings, posting validation and the open-job listing filter.

pub mod domain;
pub mod posting;
pub mod query;

pub use domain::{Job, JobId, JobType};
pub use posting::{JobDraft, ValidJobDraft};
pub use query::JobQuery;
