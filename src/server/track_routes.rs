//! Track-centric routes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::ApiError;
use crate::models::TrackReport;

#[derive(Debug, Serialize)]
pub struct LicensingEntry {
    pub party: String,
    pub publisher: String,
    pub role: String,
    pub share_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct LicensingResponse {
    pub track_id: u64,
    pub split_set: String,
    pub updated_at: String,
    pub entries: Vec<LicensingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TrackDetailRequest {
    pub sc_url: String,
}

const SPLIT_TEMPLATE: [(&str, &str, &str, f64); 5] = [
    ("Primary Rights Holder", "Sony Pub", "co-writer", 32.5),
    ("Original Artist", "Warner Chappell", "artist", 22.5),
    ("Remix Artist", "Independent", "remixer", 20.0),
    ("Producer", "UMG", "producer", 15.0),
    ("Co-Writer", "BMI", "co-writer", 10.0),
];

/// Deterministic mock licensing entries, rotated by track id, until a real
/// rights-data integration lands.
fn mock_split_entries(track_id: u64) -> Vec<LicensingEntry> {
    let offset = (track_id as usize) % SPLIT_TEMPLATE.len();
    SPLIT_TEMPLATE
        .iter()
        .cycle()
        .skip(offset)
        .take(SPLIT_TEMPLATE.len())
        .map(|(party, publisher, role, share_pct)| LicensingEntry {
            party: party.to_string(),
            publisher: publisher.to_string(),
            role: role.to_string(),
            share_pct: *share_pct,
        })
        .collect()
}

pub async fn get_licensing(Path(track_id): Path<u64>) -> Json<LicensingResponse> {
    Json(LicensingResponse {
        track_id,
        split_set: "Mock split v1".to_string(),
        updated_at: Utc::now().to_rfc3339(),
        entries: mock_split_entries(track_id),
    })
}

/// Direct detail retrieval by permalink URL, for callers that do not consume
/// the SSE streams.
pub async fn get_track_detail(
    State(state): State<AppState>,
    Json(payload): Json<TrackDetailRequest>,
) -> Result<Json<TrackReport>, ApiError> {
    let report = state.pipeline.analyze_url(&payload.sc_url).await?;
    Ok(Json(report))
}
