//! Relaylist library interface
//!
//! SMS export parsing, conversation analysis, Spotify recommendations and
//! the HTTP API that ties them together. Exposed as a library for the
//! binary and integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use services::spotify::{MusicCatalog, SpotifyAuth};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Music catalog, absent when Spotify is not configured
    pub catalog: Option<Arc<dyn MusicCatalog>>,
    /// OAuth state for user login, absent when Spotify is not configured
    pub spotify_auth: Option<Arc<SpotifyAuth>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            catalog: None,
            spotify_auth: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn MusicCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_spotify_auth(mut self, auth: Arc<SpotifyAuth>) -> Self {
        self.spotify_auth = Some(auth);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::session_routes())
        .merge(api::recommendation_routes())
        .merge(api::genre_routes())
        .merge(api::spotify_auth_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
