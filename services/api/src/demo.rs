use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use job_board::accounts::{Actor, SignupRequest};
use job_board::applications::{ApplicationStatus, ResumeUpload, PDF_SIGNATURE};
use job_board::board::{BoardError, BoardService, MemoryStore};
use job_board::clock::FixedClock;
use job_board::config::{BoardConfig, TransitionMode};
use job_board::error::AppError;
use job_board::jobs::{JobDraft, JobQuery, JobType};

use crate::infra::LogNotifier;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the walkthrough runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Days until the demo posting's deadline.
    #[arg(long, default_value_t = 14)]
    pub(crate) deadline_days: i64,
    /// Enforce the status graph during the walkthrough.
    #[arg(long)]
    pub(crate) strict_transitions: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        deadline_days,
        strict_transitions,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = BoardConfig {
        transitions: if strict_transitions {
            TransitionMode::Strict
        } else {
            TransitionMode::Permissive
        },
        ..BoardConfig::default()
    };
    let service = BoardService::with_clock(
        Arc::new(MemoryStore::new()),
        Arc::new(LogNotifier),
        config,
        Arc::new(FixedClock::on(today)),
    );

    println!(
        "Job board walkthrough ({today}, {:?} transitions)",
        service.config().transitions
    );

    let employer: Actor = service
        .register(SignupRequest {
            username: "acme-hr".to_string(),
            email: "hr@acme.example".to_string(),
            role: "employer".to_string(),
            company: Some("Acme Corp".to_string()),
            ..SignupRequest::default()
        })?
        .into();
    let rival: Actor = service
        .register(SignupRequest {
            username: "globex-hr".to_string(),
            email: "hr@globex.example".to_string(),
            role: "employer".to_string(),
            company: Some("Globex".to_string()),
            ..SignupRequest::default()
        })?
        .into();
    let applicant: Actor = service
        .register(SignupRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            role: "applicant".to_string(),
            summary: Some("Backend developer".to_string()),
            skills: Some("Rust, SQL".to_string()),
            ..SignupRequest::default()
        })?
        .into();
    println!("- registered employer, rival employer and applicant");

    let job = service.create_job(
        &employer,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the hiring pipeline services.".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            salary_min: Some(60_000),
            salary_max: Some(90_000),
            skills: "rust,  sql ,".to_string(),
            is_open: true,
            deadline: Some(today + chrono::Duration::days(deadline_days.max(0))),
            ..JobDraft::default()
        },
    )?;
    println!(
        "- posted {} '{}' (skills: {}, deadline {})",
        job.id, job.title, job.skills, job.deadline
    );

    let listed = service.list_open_jobs(&JobQuery {
        skills: Some("rust".to_string()),
        ..JobQuery::default()
    })?;
    println!("- {} open job(s) match skill 'rust'", listed.len());

    let fake = ResumeUpload::new(
        "cv.pdf",
        Some("application/pdf".to_string()),
        b"not a pdf".to_vec(),
    );
    report(
        "apply with a disguised text file",
        service.apply(&applicant, &job.id, fake, String::new()),
    );

    let application =
        service.apply(&applicant, &job.id, resume(), "Keen to join.".to_string())?;
    println!(
        "- applied: {} is '{}'",
        application.id,
        application.status.label()
    );

    report(
        "apply again",
        service.apply(&applicant, &job.id, resume(), String::new()),
    );
    report(
        "rival employer shortlists",
        service.change_status(&rival, &application.id, ApplicationStatus::Shortlisted),
    );

    for status in [
        ApplicationStatus::UnderReview,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Hired,
    ] {
        let moved = service.change_status(&employer, &application.id, status)?;
        println!("- owner moved application to '{}'", moved.status.label());
    }
    report(
        "owner reopens a hired application",
        service.change_status(&employer, &application.id, ApplicationStatus::UnderReview),
    );

    let file = service.download_resume(&employer, &application.id)?;
    println!(
        "- employer downloaded {} ({} bytes)",
        file.file_name,
        file.bytes.len()
    );

    let dashboard = service.employer_dashboard(&employer)?;
    println!(
        "- employer dashboard: {} job(s), {} active, {} application(s)",
        dashboard.total_jobs, dashboard.active_jobs, dashboard.applications
    );
    for view in service.applicant_dashboard(&applicant)?.applications {
        println!(
            "- applicant sees {} for {}: {}",
            view.application_id, view.job_id, view.status
        );
    }

    Ok(())
}

fn resume() -> ResumeUpload {
    let mut bytes = PDF_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"1.7\n% demo resume\n");
    ResumeUpload::new("ana-cv.pdf", Some("application/pdf".to_string()), bytes)
}

fn report<T>(step: &str, outcome: Result<T, BoardError>) {
    match outcome {
        Ok(_) => println!("- {step}: accepted"),
        Err(error) => println!("- {step}: refused ({error})"),
    }
}
