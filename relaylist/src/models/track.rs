//! Recommended track

use super::Emotion;
use crate::services::spotify::AudioFeatures;
use serde::{Deserialize, Serialize};

/// A track proposed for the playlist, with its score and explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedTrack {
    pub id: String,
    pub name: String,
    /// Comma-joined artist names
    pub artist: String,
    pub album: String,
    pub spotify_url: Option<String>,
    pub preview_url: Option<String>,
    pub duration_ms: u64,
    pub popularity: u32,
    #[serde(default)]
    pub explicit: bool,
    /// Genre, "profile-based" or "seed-based"
    pub genre_source: String,
    pub emotion_match: Emotion,
    pub image_url: Option<String>,
    pub relevance_score: f64,
    pub emotion_match_score: Option<f64>,
    pub audio_features: Option<AudioFeatures>,
    pub reason: String,
}
