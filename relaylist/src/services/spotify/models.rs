//! Spotify Web API payloads

use crate::models::AudioFeature;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: Album,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub explicit: bool,
}

impl Track {
    /// Artist names joined with ", "
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First (largest) album image
    pub fn image_url(&self) -> Option<String> {
        self.album.images.first().map(|i| i.url.clone())
    }

    pub fn uri(&self) -> String {
        track_uri(&self.id)
    }
}

pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<Track>>,
    pub artists: Option<Paging<Artist>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}

/// Audio analysis of one track
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioFeatures {
    pub id: String,
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    /// Beats per minute
    pub tempo: f64,
    pub acousticness: f64,
    /// Decibels, typically -60..0
    pub loudness: f64,
    pub instrumentalness: f64,
    pub mode: i32,
}

impl AudioFeatures {
    pub fn value(&self, feature: AudioFeature) -> f64 {
        match feature {
            AudioFeature::Valence => self.valence,
            AudioFeature::Energy => self.energy,
            AudioFeature::Danceability => self.danceability,
            AudioFeature::Tempo => self.tempo,
            AudioFeature::Acousticness => self.acousticness,
            AudioFeature::Loudness => self.loudness,
            AudioFeature::Instrumentalness => self.instrumentalness,
            AudioFeature::Mode => f64::from(self.mode),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePlaylistBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddItemsBody {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreSeedsResponse {
    pub genres: Vec<String>,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// `{"error": {"status": .., "message": ..}}` returned by the Web API
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

/// Parameters for the recommendations endpoint
///
/// Spotify accepts at most five seeds in total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationRequest {
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub seed_genres: Vec<String>,
    pub limit: u32,
    /// Tunable attributes such as `("target_valence", "0.7")`
    pub attributes: Vec<(String, String)>,
}

impl RecommendationRequest {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn target(mut self, feature: AudioFeature, value: f64) -> Self {
        self.attributes
            .push((format!("target_{}", feature.name()), value.to_string()));
        self
    }

    pub fn seed_count(&self) -> usize {
        self.seed_artists.len() + self.seed_tracks.len() + self.seed_genres.len()
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("limit".to_string(), self.limit.to_string())];
        for (key, seeds) in [
            ("seed_artists", &self.seed_artists),
            ("seed_tracks", &self.seed_tracks),
            ("seed_genres", &self.seed_genres),
        ] {
            if !seeds.is_empty() {
                query.push((key.to_string(), seeds.join(",")));
            }
        }
        query.extend(self.attributes.iter().cloned());
        query
    }
}
