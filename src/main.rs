use axum::http::HeaderValue;

mod app;
mod applications;
mod auth;
mod config;
mod error;
mod jobs;
mod mailer;
mod profiles;
mod state;
mod storage;
mod uploads;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "jobboard=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    let frontend_origin: HeaderValue = std::env::var("FRONTEND_URL")
        .unwrap_or_else(|_| "http://localhost:5173".into())
        .parse()?;

    let app = app::build_app(app_state, frontend_origin);
    app::serve(app).await
}
