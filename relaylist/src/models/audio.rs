//! Emotion labels and Spotify audio features

use serde::{Deserialize, Serialize};
use std::fmt;

/// Emotion detected in a conversation
///
/// Variant order is the keyword matching order; the first emotion matched
/// in a message is its primary emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// Case-insensitive lookup; unknown labels yield `None`
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Emotion::ALL.into_iter().find(|e| e.as_str() == label)
    }

    /// Case-insensitive lookup falling back to neutral
    pub fn parse_or_neutral(label: &str) -> Self {
        Emotion::parse(label).unwrap_or(Emotion::Neutral)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable Spotify audio feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFeature {
    Valence,
    Energy,
    Danceability,
    Tempo,
    Acousticness,
    Loudness,
    Instrumentalness,
    Mode,
}

impl AudioFeature {
    /// Name used by the Spotify API (`target_<name>`, `min_<name>`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            AudioFeature::Valence => "valence",
            AudioFeature::Energy => "energy",
            AudioFeature::Danceability => "danceability",
            AudioFeature::Tempo => "tempo",
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Loudness => "loudness",
            AudioFeature::Instrumentalness => "instrumentalness",
            AudioFeature::Mode => "mode",
        }
    }

    /// Whether the feature is a 0..1 ratio (tempo and loudness are not)
    pub fn is_unit_interval(&self) -> bool {
        !matches!(self, AudioFeature::Tempo | AudioFeature::Loudness)
    }
}

impl fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
