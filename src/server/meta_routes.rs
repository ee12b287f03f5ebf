//! Liveness and configuration status routes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::state::AppState;
use crate::config::CredentialCheck;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub credentials: Vec<CredentialCheck>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        credentials: state.credentials.clone(),
    })
}
