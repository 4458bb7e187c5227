use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;

pub use repo::{User, UserRole};
pub use session::{Employer, Jobseeker, Session, SessionKeys};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
