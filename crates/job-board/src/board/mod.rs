//! Job board service: storage seams, the service composing every rule, and its HTTP router.

pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use memory::MemoryStore;
pub use repository::{
    AccountRepository, ApplicationRepository, BoardStore, JobRepository, RepositoryError,
    ResumeStore,
};
pub use router::{board_router, FILE_NAME_HEADER, USER_HEADER};
pub use service::{
    ApplicantDashboard, ApplicantEntry, BoardError, BoardService, EmployerDashboard, ResumeFile,
};
