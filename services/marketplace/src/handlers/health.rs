use axum::{extract::State, http::StatusCode};

use fixlane_core::health::check_database;

use crate::state::AppState;

/// `GET /readyz`: ready once the database answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    check_database(&state.db).await
}
