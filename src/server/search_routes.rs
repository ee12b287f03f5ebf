//! Search and analysis routes.
//!
//! The search endpoints stream progress over SSE: a `status` event when the
//! search starts and when seeds are found, one `track` event per enriched
//! report, and a final `complete` event with the ranked result set. Long
//! enrichment runs stay responsive this way instead of buffering for
//! minutes behind one response.

use std::convert::Infallible;

use axum::extract::{Multipart, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::warn;

use super::state::AppState;
use super::ApiError;
use crate::catalog_import::parse_catalog_csv;
use crate::models::TrackReport;
use crate::pipeline::rank_reports;

const CATALOG_LIMIT_MAX: usize = 20;

#[derive(Debug, Deserialize)]
pub struct AnalyzeUrlRequest {
    pub sc_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchRequest {
    pub artist_name: String,
    #[serde(default)]
    pub tracks_to_fetch: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SongSearchRequest {
    pub song_name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub tracks_to_fetch: Option<usize>,
    #[serde(default)]
    pub isrc_override: Option<String>,
}

fn sse_event(kind: &str, payload: serde_json::Value) -> Event {
    Event::default()
        .event(kind)
        .json_data(&payload)
        .unwrap_or_default()
}

fn sse_stream(
    receiver: mpsc::Receiver<Event>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        receiver
            .recv()
            .await
            .map(|event| (Ok::<_, Infallible>(event), receiver))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn emit_report(sender: &mpsc::Sender<Event>, index: usize, total: usize, report: &TrackReport) {
    let payload = json!({
        "index": index,
        "total": total,
        "track": report,
    });
    let _ = sender.send(sse_event("track", payload)).await;
}

/// Analyze one permalink URL and return one enriched report.
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeUrlRequest>,
) -> Result<Json<TrackReport>, ApiError> {
    if payload.sc_url.trim().len() < 8 {
        return Err(ApiError::BadRequest("sc_url is not a valid URL".to_string()));
    }
    let report = state.pipeline.analyze_url(&payload.sc_url).await?;
    Ok(Json(report))
}

/// SSE stream of enriched reports for remixes seeded from an artist name.
pub async fn search_artist(
    State(state): State<AppState>,
    Json(payload): Json<ArtistSearchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let artist = payload.artist_name.trim().to_string();
    if artist.is_empty() {
        return Err(ApiError::BadRequest("artist_name must not be empty".to_string()));
    }
    let limit = payload
        .tracks_to_fetch
        .unwrap_or(state.search.tracks_to_fetch);

    let (sender, receiver) = mpsc::channel::<Event>(16);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let _ = sender
            .send(sse_event(
                "status",
                json!({ "message": "search_started", "artist": artist }),
            ))
            .await;

        let seeds = pipeline
            .search_remix_seeds(&artist, None, limit)
            .await;
        let _ = sender
            .send(sse_event(
                "status",
                json!({ "message": "tracks_found", "count": seeds.len() }),
            ))
            .await;

        let mut reports = Vec::with_capacity(seeds.len());
        for (index, seed) in seeds.iter().enumerate() {
            let report = pipeline.analyze_track(seed, None).await;
            emit_report(&sender, index + 1, seeds.len(), &report).await;
            reports.push(report);
        }

        let ranked = rank_reports(reports);
        let _ = sender
            .send(sse_event(
                "complete",
                json!({ "count": ranked.len(), "results": ranked }),
            ))
            .await;
    });

    Ok(sse_stream(receiver))
}

/// SSE stream of enriched reports for remixes of one song.
pub async fn search_song(
    State(state): State<AppState>,
    Json(payload): Json<SongSearchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let song = payload.song_name.trim().to_string();
    if song.is_empty() {
        return Err(ApiError::BadRequest("song_name must not be empty".to_string()));
    }
    let limit = payload
        .tracks_to_fetch
        .unwrap_or(state.search.tracks_to_fetch);
    let artist = payload.artist_name.clone();
    let isrc_override = payload.isrc_override.clone();

    let (sender, receiver) = mpsc::channel::<Event>(16);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let _ = sender
            .send(sse_event(
                "status",
                json!({ "message": "search_started", "song": song }),
            ))
            .await;

        let seeds = pipeline
            .search_remix_seeds(&song, artist.as_deref(), limit)
            .await;
        let _ = sender
            .send(sse_event(
                "status",
                json!({ "message": "tracks_found", "count": seeds.len() }),
            ))
            .await;

        let mut reports = Vec::with_capacity(seeds.len());
        for (index, seed) in seeds.iter().enumerate() {
            let report = pipeline.analyze_track(seed, isrc_override.as_deref()).await;
            emit_report(&sender, index + 1, seeds.len(), &report).await;
            reports.push(report);
        }

        let ranked = rank_reports(reports);
        let _ = sender
            .send(sse_event(
                "complete",
                json!({ "count": ranked.len(), "results": ranked }),
            ))
            .await;
    });

    Ok(sse_stream(receiver))
}

/// Catalog workflow: multipart CSV upload, then an SSE stream of enriched
/// remix reports per song, ranked at the end.
pub async fn search_catalog(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let mut data: Option<Vec<u8>> = None;
    let mut limit_per_song = state.search.catalog_limit_per_song;
    let mut min_plays = state.search.catalog_min_plays;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_lowercase();
                if !filename.ends_with(".csv") {
                    return Err(ApiError::BadRequest(
                        "Catalog file must be .csv".to_string(),
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                data = Some(bytes.to_vec());
            }
            Some("limit_remixes") => {
                if let Ok(text) = field.text().await {
                    if let Ok(value) = text.trim().parse::<usize>() {
                        limit_per_song = value.clamp(1, CATALOG_LIMIT_MAX);
                    }
                }
            }
            Some("min_plays") => {
                if let Ok(text) = field.text().await {
                    if let Ok(value) = text.trim().parse::<u64>() {
                        min_plays = value;
                    }
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("Catalog file is required".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest(
            "Uploaded catalog file is empty".to_string(),
        ));
    }
    let records = parse_catalog_csv(&data[..])
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse catalog: {}", e)))?;

    let (sender, receiver) = mpsc::channel::<Event>(16);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let songs: Vec<_> = crate::catalog_import::dedupe_by_isrc(records)
            .into_iter()
            .filter(|record| record.title.is_some())
            .collect();
        let _ = sender
            .send(sse_event(
                "status",
                json!({ "message": "catalog_loaded", "count": songs.len() }),
            ))
            .await;

        let mut all_reports = Vec::new();
        for (index, record) in songs.iter().enumerate() {
            let title = record.title.clone().unwrap_or_default();
            let _ = sender
                .send(sse_event(
                    "status",
                    json!({
                        "message": "processing_song",
                        "song": title,
                        "index": index + 1,
                        "total": songs.len(),
                    }),
                ))
                .await;

            let reports = pipeline
                .search_song_remixes(
                    &title,
                    record.artist.as_deref(),
                    limit_per_song,
                    record.isrc.as_deref(),
                )
                .await;
            for report in reports {
                if report.metrics.plays < min_plays {
                    continue;
                }
                let _ = sender
                    .send(sse_event(
                        "track",
                        json!({ "track": report, "song": title, "song_index": index + 1 }),
                    ))
                    .await;
                all_reports.push(report);
            }
        }

        let ranked = rank_reports(all_reports);
        if ranked.is_empty() {
            warn!("Catalog analysis produced no reports");
        }
        let _ = sender
            .send(sse_event(
                "complete",
                json!({ "count": ranked.len(), "results": ranked }),
            ))
            .await;
    });

    Ok(sse_stream(receiver))
}
