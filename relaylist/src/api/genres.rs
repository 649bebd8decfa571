//! Genre catalog endpoint

use crate::services::music_preferences::{GENRES, MAX_GENRES, MAX_SEEDS};
use crate::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GenreCatalog {
    pub genres: &'static [&'static str],
    /// Most genres a genre selection keeps
    pub max_genres: usize,
    /// Most artist (and track) names a seed input keeps
    pub max_seeds: usize,
}

/// GET /api/genres
pub async fn list_genres() -> Json<GenreCatalog> {
    Json(GenreCatalog {
        genres: GENRES,
        max_genres: MAX_GENRES,
        max_seeds: MAX_SEEDS,
    })
}

pub fn genre_routes() -> Router<AppState> {
    Router::new().route("/api/genres", get(list_genres))
}
