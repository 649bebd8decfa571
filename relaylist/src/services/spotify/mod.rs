//! Spotify integration: OAuth, Web API client and payload types

mod auth;
mod client;
mod error;
mod models;

pub use auth::{SpotifyAuth, TokenSet, DEFAULT_ACCOUNTS_URL, SCOPES};
pub use client::{
    build_http_client, MusicCatalog, SpotifyClient, BATCH_SIZE, DEFAULT_API_URL,
    DEFAULT_REQUESTS_PER_SECOND,
};
pub use error::SpotifyError;
pub use models::{
    track_uri, Album, Artist, AudioFeatures, ExternalUrls, Image, Playlist,
    RecommendationRequest, SimplifiedArtist, Track, UserProfile,
};
