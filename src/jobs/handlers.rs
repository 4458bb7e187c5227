use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Employer, Session},
    error::ApiError,
    state::AppState,
};

use super::dto::{
    EmployerListings, JobPayload, JobSearchParams, JobSearchResponse, JobStats, PaginationMeta,
};
use super::repo::JobListing;

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_jobs).post(create_job))
        .route("/:id", get(get_job).put(update_job))
        .route("/:id/close", patch(close_job))
        .route("/employer/listings", get(employer_listings))
        .route("/stats", get(job_stats))
}

#[instrument(skip(state))]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobSearchResponse>, ApiError> {
    let (page, limit) = params.page_and_limit();
    let (jobs, total) = JobListing::search(&state.db, &params).await?;
    Ok(Json(JobSearchResponse {
        jobs,
        pagination: PaginationMeta::new(total, page, limit),
    }))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<JobListing>, ApiError> {
    let job = JobListing::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

#[instrument(skip(state, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
    Json(payload): Json<JobPayload>,
) -> Result<(StatusCode, Json<JobListing>), ApiError> {
    payload.validate()?;
    let job = JobListing::create(&state.db, employer_id, &payload).await?;
    info!(job_id = %job.id, %employer_id, "job listing created");
    Ok((StatusCode::CREATED, Json(job)))
}

#[instrument(skip(state, payload))]
pub async fn update_job(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobPayload>,
) -> Result<Json<JobListing>, ApiError> {
    payload.validate()?;
    let job = JobListing::update_owned(&state.db, id, employer_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

#[instrument(skip(state))]
pub async fn close_job(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
    Path(id): Path<Uuid>,
) -> Result<Json<JobListing>, ApiError> {
    let job = JobListing::close_owned(&state.db, id, employer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    info!(job_id = %job.id, %employer_id, "job listing closed");
    Ok(Json(job))
}

#[instrument(skip(state))]
pub async fn employer_listings(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
) -> Result<Json<EmployerListings>, ApiError> {
    let jobs = JobListing::list_by_employer(&state.db, employer_id).await?;
    Ok(Json(EmployerListings { jobs }))
}

#[instrument(skip(state))]
pub async fn job_stats(
    State(state): State<AppState>,
    Employer(employer_id): Employer,
) -> Result<Json<JobStats>, ApiError> {
    let stats = JobListing::stats(&state.db, employer_id).await?;
    Ok(Json(stats))
}
