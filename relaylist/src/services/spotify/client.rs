//! Spotify Web API client
//!
//! Every request waits on a shared rate limiter. Status mapping:
//! 429 → `RateLimited` (with `Retry-After`), 401 → `Unauthorized`, any
//! other non-2xx → `Api`.

use super::auth::SpotifyAuth;
use super::models::{
    AddItemsBody, Artist, AudioFeatures, AudioFeaturesResponse, CreatePlaylistBody, ErrorBody,
    GenreSeedsResponse, Paging, Playlist, RecommendationRequest, RecommendationsResponse,
    SearchResponse, Track, UserProfile,
};
use super::SpotifyError;
use crate::services::music_preferences::TimeRange;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Requests per second sent to Spotify
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Spotify caps ids per audio-features call and items per playlist add
pub const BATCH_SIZE: usize = 100;

const USER_AGENT: &str = concat!("Relaylist/", env!("CARGO_PKG_VERSION"));

/// Music catalog operations the recommender and API rely on
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError>;

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, SpotifyError>;

    async fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Track>, SpotifyError>;

    /// Features in the same order as `track_ids`; unknown tracks yield `None`
    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError>;

    async fn top_artists(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Artist>, SpotifyError>;

    async fn top_tracks(&self, limit: u32, time_range: TimeRange)
        -> Result<Vec<Track>, SpotifyError>;

    /// Create a playlist for the logged-in user and fill it
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
        track_ids: &[String],
    ) -> Result<Playlist, SpotifyError>;
}

/// Which token a request is sent with
#[derive(Debug, Clone, Copy)]
enum TokenKind {
    /// User token when logged in, app token otherwise
    Any,
    User,
}

pub struct SpotifyClient {
    http: reqwest::Client,
    api_url: String,
    auth: Arc<SpotifyAuth>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl SpotifyClient {
    pub fn new(auth: Arc<SpotifyAuth>) -> Result<Self, SpotifyError> {
        let http = build_http_client()?;
        Ok(Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            auth,
            rate_limiter: RateLimiter::direct(quota(DEFAULT_REQUESTS_PER_SECOND)),
        })
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_requests_per_second(mut self, per_second: u32) -> Self {
        self.rate_limiter = RateLimiter::direct(quota(per_second));
        self
    }

    pub fn auth(&self) -> &Arc<SpotifyAuth> {
        &self.auth
    }

    async fn token(&self, kind: TokenKind) -> Result<String, SpotifyError> {
        match kind {
            TokenKind::Any => self.auth.access_token().await,
            TokenKind::User => self.auth.user_access_token().await,
        }
    }

    /// Rate-limit, send and map the response status
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        kind: TokenKind,
    ) -> Result<reqwest::Response, SpotifyError> {
        let token = self.token(kind).await?;

        self.rate_limiter.until_ready().await;

        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        kind: TokenKind,
    ) -> Result<T, SpotifyError> {
        let url = format!("{}{}", self.api_url, path);
        debug!(url = %url, "Spotify GET");

        let response = self.send(self.http.get(&url).query(query), kind).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    async fn search(
        &self,
        query: &str,
        kind: &str,
        limit: u32,
    ) -> Result<SearchResponse, SpotifyError> {
        self.get_json(
            "/search",
            &[
                ("q".to_string(), query.to_string()),
                ("type".to_string(), kind.to_string()),
                ("limit".to_string(), limit.to_string()),
            ],
            TokenKind::Any,
        )
        .await
    }

    pub async fn current_user(&self) -> Result<UserProfile, SpotifyError> {
        self.get_json("/me", &[], TokenKind::User).await
    }

    /// Genres accepted as recommendation seeds
    pub async fn genre_seeds(&self) -> Result<Vec<String>, SpotifyError> {
        let response: GenreSeedsResponse = self
            .get_json("/recommendations/available-genre-seeds", &[], TokenKind::Any)
            .await?;
        Ok(response.genres)
    }

    async fn add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), SpotifyError> {
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);

        for batch in track_ids.chunks(BATCH_SIZE) {
            let body = AddItemsBody {
                uris: batch.iter().map(|id| super::models::track_uri(id)).collect(),
            };
            self.send(self.http.post(&url).json(&body), TokenKind::User)
                .await?;
        }
        Ok(())
    }

    async fn top_items<T: DeserializeOwned>(
        &self,
        kind: &str,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<T>, SpotifyError> {
        let page: Paging<T> = self
            .get_json(
                &format!("/me/top/{}", kind),
                &[
                    ("limit".to_string(), limit.to_string()),
                    ("time_range".to_string(), time_range.as_str().to_string()),
                ],
                TokenKind::User,
            )
            .await?;
        Ok(page.items)
    }
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        let response = self.search(query, "track", limit).await?;
        Ok(response.tracks.map(|p| p.items).unwrap_or_default())
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, SpotifyError> {
        let response = self.search(query, "artist", limit).await?;
        Ok(response.artists.map(|p| p.items).unwrap_or_default())
    }

    async fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Track>, SpotifyError> {
        let response: RecommendationsResponse = self
            .get_json("/recommendations", &request.query(), TokenKind::Any)
            .await?;
        Ok(response.tracks)
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        let mut features = Vec::with_capacity(track_ids.len());

        for batch in track_ids.chunks(BATCH_SIZE) {
            let response: AudioFeaturesResponse = self
                .get_json(
                    "/audio-features",
                    &[("ids".to_string(), batch.join(","))],
                    TokenKind::Any,
                )
                .await?;

            let mut batch_features = response.audio_features;
            batch_features.resize(batch.len(), None);
            features.extend(batch_features);
        }

        Ok(features)
    }

    async fn top_artists(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Artist>, SpotifyError> {
        self.top_items("artists", limit, time_range).await
    }

    async fn top_tracks(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Track>, SpotifyError> {
        self.top_items("tracks", limit, time_range).await
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
        track_ids: &[String],
    ) -> Result<Playlist, SpotifyError> {
        let user = self.current_user().await?;

        let url = format!(
            "{}/users/{}/playlists",
            self.api_url,
            urlencoding::encode(&user.id)
        );
        let body = CreatePlaylistBody {
            name,
            description,
            public,
        };
        let playlist: Playlist = self
            .send(self.http.post(&url).json(&body), TokenKind::User)
            .await?
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        if !track_ids.is_empty() {
            self.add_items(&playlist.id, track_ids).await?;
        }

        tracing::info!(
            playlist = %playlist.id,
            tracks = track_ids.len(),
            "Created Spotify playlist"
        );
        Ok(playlist)
    }
}

/// HTTP client shared by the API client and the OAuth flows
pub fn build_http_client() -> Result<reqwest::Client, SpotifyError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| SpotifyError::Network(e.to_string()))
}

fn quota(per_second: u32) -> Quota {
    Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(SpotifyError::RateLimited { retry_after });
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SpotifyError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(SpotifyError::Api {
        status: status.as_u16(),
        message,
    })
}
