//! Spotify login endpoints
//!
//! `/auth/spotify/login` redirects to Spotify's consent page; Spotify sends
//! the user back to `/callback` with a code and the CSRF state.

use crate::services::spotify::SpotifyAuth;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Query string Spotify appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpotifyStatus {
    /// Client id and secret were found at startup
    pub configured: bool,
    /// A user token is held
    pub authenticated: bool,
}

/// Build Spotify login routes
pub fn spotify_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/spotify/login", get(login))
        .route("/auth/spotify/logout", post(logout))
        .route("/callback", get(callback))
        .route("/api/spotify/status", get(status))
}

fn auth(state: &AppState) -> ApiResult<Arc<SpotifyAuth>> {
    state
        .spotify_auth
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Spotify is not configured".to_string()))
}

/// GET /auth/spotify/login
pub async fn login(State(state): State<AppState>) -> ApiResult<Redirect> {
    let url = auth(&state)?.authorize_url().await;
    Ok(Redirect::to(&url))
}

/// GET /callback
///
/// **Errors:**
/// - 400 Bad Request: consent denied, missing code, or unknown state
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Redirect> {
    let auth = auth(&state)?;

    if let Some(error) = params.error {
        warn!("Spotify login denied: {}", error);
        return Err(ApiError::BadRequest(format!("Spotify login failed: {}", error)));
    }

    let returned_state = params
        .state
        .ok_or_else(|| ApiError::BadRequest("Missing state parameter".to_string()))?;
    auth.validate_state(&returned_state).await?;

    let code = params
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing code parameter".to_string()))?;
    auth.exchange_code(&code).await?;

    info!("✓ Spotify account connected");
    Ok(Redirect::to("/"))
}

/// GET /api/spotify/status
pub async fn status(State(state): State<AppState>) -> Json<SpotifyStatus> {
    let authenticated = match &state.spotify_auth {
        Some(auth) => auth.is_user_authenticated().await,
        None => false,
    };
    Json(SpotifyStatus {
        configured: state.spotify_auth.is_some(),
        authenticated,
    })
}

/// POST /auth/spotify/logout
pub async fn logout(State(state): State<AppState>) -> ApiResult<Json<SpotifyStatus>> {
    let auth = auth(&state)?;
    auth.logout().await?;
    info!("Spotify account disconnected");
    Ok(Json(SpotifyStatus {
        configured: true,
        authenticated: false,
    }))
}
