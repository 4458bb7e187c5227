use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{auth::Session, error::ApiError, state::AppState};

use super::dto::ProfilePayload;
use super::repo::Profile;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", put(upsert_profile))
        .route("/:user_id", get(get_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    _session: Session,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Profile>, ApiError> {
    payload.validate()?;
    let profile = Profile::upsert(&state.db, session.user_id, &payload).await?;
    Ok(Json(profile))
}
