//! Recommendation and playlist endpoints

use super::sessions::{load_session, session_analysis};
use crate::db::{self, StoredRecommendation};
use crate::models::RecommendedTrack;
use crate::services::music_preferences::{combine_with_analysis, RecommendationParams};
use crate::services::recommender::DEFAULT_LIMIT;
use crate::services::spotify::MusicCatalog;
use crate::services::{MusicPreferences, MusicRecommender};
use crate::{ApiError, ApiResult, AppState};
use relaylist_common::db::settings::get_setting_i64;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Hard upper bound of `limit`, whatever the settings say
pub const MAX_LIMIT: usize = 50;

const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Mood-matched playlist generated by Relaylist";

/// POST /api/sessions/:id/recommendations body
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequestBody {
    #[serde(default)]
    pub preferences: MusicPreferences,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedRecommendations {
    pub session_id: i64,
    pub method: &'static str,
    pub params: RecommendationParams,
    pub tracks: Vec<RecommendedTrack>,
}

#[derive(Debug, Serialize)]
pub struct StoredRecommendations {
    pub session_id: i64,
    pub tracks: Vec<StoredRecommendation>,
}

/// POST /api/sessions/:id/playlist body
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistRequestBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub playlist_id: String,
    pub name: String,
    pub url: Option<String>,
    pub track_count: usize,
}

/// Build recommendation routes
pub fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sessions/:id/recommendations",
            get(get_recommendations).post(generate_recommendations),
        )
        .route("/api/sessions/:id/playlist", post(create_playlist))
}

fn catalog(state: &AppState) -> ApiResult<Arc<dyn MusicCatalog>> {
    state
        .catalog
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Spotify is not configured".to_string()))
}

/// A JSON body that may be left out entirely
fn optional_json<T: Default>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

/// Limits configured in the settings table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitSettings {
    pub default: usize,
    pub max: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            max: MAX_LIMIT,
        }
    }
}

impl LimitSettings {
    pub async fn load(db: &sqlx::SqlitePool) -> ApiResult<Self> {
        let max = get_setting_i64(db, "recommendation_max_limit", MAX_LIMIT as i64).await?;
        let default =
            get_setting_i64(db, "recommendation_default_limit", DEFAULT_LIMIT as i64).await?;

        let max = max.clamp(1, MAX_LIMIT as i64) as usize;
        let default = default.clamp(1, max as i64) as usize;
        Ok(Self { default, max })
    }

    /// Check the requested track count
    pub fn resolve(&self, limit: Option<usize>) -> ApiResult<usize> {
        match limit {
            None => Ok(self.default),
            Some(n) if (1..=self.max).contains(&n) => Ok(n),
            Some(n) => Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}, got {}",
                self.max, n
            ))),
        }
    }
}

/// POST /api/sessions/:id/recommendations
///
/// Generates tracks for the session and replaces any cached ones.
///
/// **Errors:**
/// - 400 Bad Request: invalid limit or preferences
/// - 404 Not Found: unknown session
/// - 503 Service Unavailable: Spotify not configured or not answering
pub async fn generate_recommendations(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    body: Result<Json<RecommendationRequestBody>, JsonRejection>,
) -> ApiResult<Json<GeneratedRecommendations>> {
    let body = optional_json(body)?;
    let limit = LimitSettings::load(&state.db).await?.resolve(body.limit)?;
    let preferences = body.preferences.validate()?;

    let analysis = session_analysis(load_session(&state, session_id).await?)?;
    let recommender = MusicRecommender::new(catalog(&state)?);

    // A failed catalog call leaves the cached tracks untouched
    let tracks = recommender.generate(&analysis, &preferences, limit).await?;
    db::save_recommendations(&state.db, session_id, &tracks).await?;

    info!(
        "✓ {} recommendations for session {} ({})",
        tracks.len(),
        session_id,
        preferences.method()
    );

    Ok(Json(GeneratedRecommendations {
        session_id,
        method: preferences.method(),
        params: combine_with_analysis(&preferences, &analysis),
        tracks,
    }))
}

/// GET /api/sessions/:id/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<StoredRecommendations>> {
    if !db::sessions::session_exists(&state.db, session_id).await? {
        return Err(ApiError::NotFound(format!("Session {} not found", session_id)));
    }
    let tracks = db::get_recommendations(&state.db, session_id).await?;
    Ok(Json(StoredRecommendations { session_id, tracks }))
}

/// POST /api/sessions/:id/playlist
///
/// Saves the cached recommendations as a playlist of the logged-in user.
///
/// **Errors:**
/// - 401 Unauthorized: no Spotify login
/// - 404 Not Found: unknown session
/// - 409 Conflict: no recommendations generated yet
/// - 503 Service Unavailable: Spotify not configured
pub async fn create_playlist(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    body: Result<Json<PlaylistRequestBody>, JsonRejection>,
) -> ApiResult<Json<PlaylistResponse>> {
    let body = optional_json(body)?;
    let session = load_session(&state, session_id).await?;
    let catalog = catalog(&state)?;

    let tracks = db::get_recommendations(&state.db, session_id).await?;
    if tracks.is_empty() {
        return Err(ApiError::Conflict(format!(
            "Session {} has no recommendations; generate them first",
            session_id
        )));
    }
    let track_ids: Vec<String> = tracks.into_iter().map(|t| t.track_id).collect();

    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_playlist_name(session.contact_name.as_deref()));
    let description = body
        .description
        .unwrap_or_else(|| DEFAULT_PLAYLIST_DESCRIPTION.to_string());

    let playlist = catalog
        .create_playlist(&name, &description, body.public.unwrap_or(true), &track_ids)
        .await?;

    info!("✓ Created playlist {} for session {}", playlist.id, session_id);

    Ok(Json(PlaylistResponse {
        playlist_id: playlist.id,
        name,
        url: playlist.external_urls.spotify,
        track_count: track_ids.len(),
    }))
}

fn default_playlist_name(contact: Option<&str>) -> String {
    match contact.map(str::trim).filter(|c| !c.is_empty()) {
        Some(contact) => format!("Relaylist: {}", contact),
        None => "Relaylist".to_string(),
    }
}
