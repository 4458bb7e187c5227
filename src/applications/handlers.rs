use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{Employer, Jobseeker, Session},
    error::ApiError,
    jobs::JobListing,
    state::AppState,
};

use super::dto::{
    ApplicationWithApplicant, ApplicationWithJob, MessageResponse, StatusUpdateBody,
};
use super::repo::{self, JobApplication};
use super::services::{self, SubmitApplication};

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_applications).post(submit_application))
        .route("/job/:job_id", get(list_job_applications))
        .route("/:id/status", patch(update_status))
        .route("/:id/resume", get(download_resume))
        .route("/:id", delete(withdraw_application))
        // résumé cap is 5 MiB; leave headroom for the other form fields
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_own_applications(
    State(state): State<AppState>,
    Jobseeker(applicant_id): Jobseeker,
) -> Result<Json<Vec<ApplicationWithJob>>, ApiError> {
    let rows = repo::list_by_applicant(&state.db, applicant_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationWithApplicant>>, ApiError> {
    // Owner-filtered: another employer's listing is indistinguishable from a
    // missing one.
    JobListing::find_owned(&state.db, job_id, employer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let rows = repo::list_for_job(&state.db, job_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, multipart))]
pub async fn submit_application(
    State(state): State<AppState>,
    Jobseeker(applicant_id): Jobseeker,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobApplication>), ApiError> {
    let mut job_id = None;
    let mut cover_letter = None;
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("job_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                job_id = Some(
                    text.trim()
                        .parse::<Uuid>()
                        .map_err(|_| ApiError::bad_request("Invalid job ID"))?,
                );
            }
            Some("cover_letter") => {
                cover_letter = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            Some("resume") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                resume = Some((data, content_type));
            }
            _ => {}
        }
    }

    let job_id = job_id.ok_or_else(|| ApiError::bad_request("Job ID is required"))?;
    let application = services::submit_application(
        &state,
        applicant_id,
        SubmitApplication {
            job_id,
            cover_letter,
            resume,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateBody>,
) -> Result<Json<JobApplication>, ApiError> {
    let application = services::update_status(&state, employer_id, id, body.status).await?;
    Ok(Json(application))
}

#[instrument(skip(state))]
pub async fn withdraw_application(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::withdraw(&state, session.user_id, id).await?;
    Ok(Json(MessageResponse {
        message: "Application deleted successfully",
    }))
}

#[instrument(skip(state))]
pub async fn download_resume(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let url = services::resume_download_url(&state, &session, id).await?;
    Ok(Redirect::temporary(&url))
}
