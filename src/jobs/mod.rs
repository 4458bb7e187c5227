mod dto;
pub mod handlers;
pub mod repo;

pub use repo::{JobListing, JobStatus};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::job_routes()
}
