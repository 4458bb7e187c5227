mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub use repo::{ApplicationStatus, JobApplication};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::application_routes()
}
