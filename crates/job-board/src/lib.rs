//! Job board core: eligibility, application lifecycle and access control, composed by
//! [`board::BoardService`] and exposed over HTTP by [`board::board_router`].

pub mod access;
pub mod accounts;
pub mod applications;
pub mod board;
pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod notifications;
pub mod telemetry;
pub mod validation;
