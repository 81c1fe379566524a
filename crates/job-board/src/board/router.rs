use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::repository::BoardStore;
use super::service::{BoardError, BoardService};
use crate::accounts::{Actor, SignupRequest, LOGIN_PATH};
use crate::applications::{ApplicationId, ApplicationStatus, ResumeUpload};
use crate::jobs::{JobDraft, JobId, JobQuery};
use crate::notifications::Notifier;
use crate::validation::ValidationErrors;

/// Header carrying the authenticated user id, set by the session layer in front of the API.
pub const USER_HEADER: &str = "x-user-id";
/// Original file name of an uploaded resume.
pub const FILE_NAME_HEADER: &str = "x-file-name";

type SharedService<S, N> = Arc<BoardService<S, N>>;

/// Router builder exposing the job board over HTTP.
pub fn board_router<S, N>(service: SharedService<S, N>) -> Router
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    // Oversized uploads must reach the resume checks and fail there with a 422.
    let upload_limit = usize::try_from(service.config().resume.max_bytes.saturating_mul(2))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(landing_handler::<S, N>))
        .route("/api/v1/accounts/signup", post(signup_handler::<S, N>))
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<S, N>).post(create_job_handler::<S, N>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(job_detail_handler::<S, N>).put(edit_job_handler::<S, N>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(applicants_handler::<S, N>)
                .post(apply_handler::<S, N>)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/employer/jobs", get(employer_jobs_handler::<S, N>))
        .route(
            "/api/v1/applications/mine",
            get(my_applications_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(change_status_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/resume",
            get(resume_handler::<S, N>),
        )
        .route(
            "/dashboard/employer/",
            get(employer_dashboard_handler::<S, N>),
        )
        .route(
            "/dashboard/applicant/",
            get(applicant_dashboard_handler::<S, N>),
        )
        .with_state(service)
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = match &self {
            BoardError::LoginRequired => return Redirect::to(LOGIN_PATH).into_response(),
            BoardError::DuplicateApplication { existing } => {
                let payload = json!({
                    "message": self.to_string(),
                    "application_id": existing,
                });
                return (StatusCode::OK, Json(payload)).into_response();
            }
            BoardError::JobClosed { .. } | BoardError::Forbidden(_) => StatusCode::FORBIDDEN,
            BoardError::InvalidResume(_) | BoardError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BoardError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = match &self {
            BoardError::InvalidResume(rejection) => json!({
                "error": self.to_string(),
                "field": "resume",
                "detail": rejection,
            }),
            BoardError::Validation(errors) => json!({
                "error": "validation failed",
                "fields": errors.errors,
            }),
            BoardError::Forbidden(denial) => json!({
                "error": self.to_string(),
                "detail": denial,
            }),
            BoardError::Repository(error) => {
                tracing::error!(%error, "board storage failure");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(payload)).into_response()
    }
}

fn actor<S, N>(service: &BoardService<S, N>, headers: &HeaderMap) -> Result<Actor, BoardError>
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok());
    service.resolve_actor(user_id)
}

fn header_text(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub(crate) async fn landing_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match actor(&service, &headers) {
        Ok(actor) => Redirect::to(service.landing(&actor)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn signup_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Json(request): Json<SignupRequest>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match service.register(request) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_jobs_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Query(query): Query<JobQuery>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match service.list_open_jobs(&query) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_job_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result = actor(&service, &headers).and_then(|actor| service.create_job(&actor, draft));
    match result {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn job_detail_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result =
        actor(&service, &headers).and_then(|actor| service.job_detail(&actor, &JobId(job_id)));
    match result {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn edit_job_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result = actor(&service, &headers)
        .and_then(|actor| service.edit_job(&actor, &JobId(job_id), draft));
    match result {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn employer_jobs_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match actor(&service, &headers).and_then(|actor| service.employer_jobs(&actor)) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplyParams {
    #[serde(default)]
    cover_letter: Option<String>,
}

/// The request body is the raw resume file.
pub(crate) async fn apply_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Query(params): Query<ApplyParams>,
    body: Bytes,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let upload = ResumeUpload::new(
        header_text(&headers, FILE_NAME_HEADER).unwrap_or_default(),
        header_text(&headers, header::CONTENT_TYPE),
        body.to_vec(),
    );
    let cover_letter = params.cover_letter.unwrap_or_default();

    let result = actor(&service, &headers)
        .and_then(|actor| service.apply(&actor, &JobId(job_id), upload, cover_letter));
    match result {
        Ok(application) => {
            let view = application.status_view();
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn applicants_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result = actor(&service, &headers)
        .and_then(|actor| service.job_applicants(&actor, &JobId(job_id)));
    match result {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn my_applications_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match actor(&service, &headers).and_then(|actor| service.my_applications(&actor)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    status: String,
}

pub(crate) async fn change_status_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result = actor(&service, &headers).and_then(|actor| {
        let Some(status) = ApplicationStatus::parse(&update.status) else {
            let mut errors = ValidationErrors::default();
            errors.add(
                "status",
                format!("'{}' is not a valid application status.", update.status),
            );
            return Err(errors.into());
        };
        service.change_status(&actor, &ApplicationId(application_id), status)
    });
    match result {
        Ok(application) => (StatusCode::OK, Json(application.status_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn resume_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    let result = actor(&service, &headers)
        .and_then(|actor| service.download_resume(&actor, &ApplicationId(application_id)));
    let file = match result {
        Ok(file) => file,
        Err(error) => return error.into_response(),
    };

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

pub(crate) async fn employer_dashboard_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match actor(&service, &headers).and_then(|actor| service.employer_dashboard(&actor)) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn applicant_dashboard_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    N: Notifier + 'static,
{
    match actor(&service, &headers).and_then(|actor| service.applicant_dashboard(&actor)) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error.into_response(),
    }
}
