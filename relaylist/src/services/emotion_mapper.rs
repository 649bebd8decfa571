//! Emotion → music parameter mapping
//!
//! Translates a conversation's dominant emotion and average sentiment into
//! Spotify audio feature targets, genre suggestions and a short mood
//! description.

use crate::models::{AudioFeature, Emotion};
use serde::Serialize;

pub const DEFAULT_GENRE_LIMIT: usize = 5;

/// Weight of the emotion's own valence midpoint in the blended target
const EMOTION_VALENCE_WEIGHT: f64 = 0.7;
const SENTIMENT_VALENCE_WEIGHT: f64 = 0.3;

/// Inclusive target range of one audio feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRange {
    pub feature: AudioFeature,
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    const fn new(feature: AudioFeature, min: f64, max: f64) -> Self {
        Self { feature, min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Audio characteristics associated with an emotion
#[derive(Debug, Clone, Copy)]
pub struct EmotionProfile {
    pub ranges: &'static [FeatureRange],
    /// Musical mode: 1 major, 0 minor
    pub mode: Option<u8>,
}

impl EmotionProfile {
    pub fn range(&self, feature: AudioFeature) -> Option<&FeatureRange> {
        self.ranges.iter().find(|r| r.feature == feature)
    }
}

use AudioFeature::{
    Acousticness, Danceability, Energy, Instrumentalness, Loudness, Tempo, Valence,
};

const JOY_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.6, 1.0),
    FeatureRange::new(Energy, 0.5, 0.9),
    FeatureRange::new(Danceability, 0.5, 1.0),
    FeatureRange::new(Tempo, 100.0, 150.0),
    FeatureRange::new(Acousticness, 0.0, 0.5),
];

const SADNESS_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.0, 0.4),
    FeatureRange::new(Energy, 0.2, 0.5),
    FeatureRange::new(Danceability, 0.0, 0.4),
    FeatureRange::new(Tempo, 60.0, 100.0),
    FeatureRange::new(Acousticness, 0.3, 1.0),
];

const ANGER_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.0, 0.5),
    FeatureRange::new(Energy, 0.7, 1.0),
    FeatureRange::new(Danceability, 0.3, 0.7),
    FeatureRange::new(Tempo, 120.0, 180.0),
    FeatureRange::new(Loudness, -5.0, 0.0),
    FeatureRange::new(Instrumentalness, 0.0, 0.5),
];

const FEAR_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.2, 0.5),
    FeatureRange::new(Energy, 0.4, 0.7),
    FeatureRange::new(Danceability, 0.2, 0.5),
    FeatureRange::new(Tempo, 80.0, 120.0),
    FeatureRange::new(Acousticness, 0.2, 0.7),
    FeatureRange::new(Instrumentalness, 0.0, 0.6),
];

const SURPRISE_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.5, 0.8),
    FeatureRange::new(Energy, 0.6, 0.9),
    FeatureRange::new(Danceability, 0.5, 0.8),
    FeatureRange::new(Tempo, 110.0, 160.0),
    FeatureRange::new(Acousticness, 0.0, 0.5),
];

const NEUTRAL_RANGES: &[FeatureRange] = &[
    FeatureRange::new(Valence, 0.4, 0.6),
    FeatureRange::new(Energy, 0.4, 0.6),
    FeatureRange::new(Danceability, 0.4, 0.6),
    FeatureRange::new(Tempo, 90.0, 130.0),
    FeatureRange::new(Acousticness, 0.2, 0.6),
];

pub fn audio_profile(emotion: Emotion) -> EmotionProfile {
    match emotion {
        Emotion::Joy => EmotionProfile { ranges: JOY_RANGES, mode: Some(1) },
        Emotion::Sadness => EmotionProfile { ranges: SADNESS_RANGES, mode: Some(0) },
        Emotion::Anger => EmotionProfile { ranges: ANGER_RANGES, mode: None },
        Emotion::Fear => EmotionProfile { ranges: FEAR_RANGES, mode: None },
        Emotion::Surprise => EmotionProfile { ranges: SURPRISE_RANGES, mode: None },
        Emotion::Neutral => EmotionProfile { ranges: NEUTRAL_RANGES, mode: None },
    }
}

fn genres_for(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &[
            "pop", "dance", "funk", "disco", "reggae", "edm", "house", "indie-pop", "summer",
        ],
        Emotion::Sadness => &[
            "indie", "acoustic", "blues", "r&b", "soul", "singer-songwriter", "folk", "ambient",
            "sad",
        ],
        Emotion::Anger => &[
            "metal", "punk", "hard-rock", "rap", "hardcore", "dubstep", "drum-and-bass", "grunge",
            "rock",
        ],
        Emotion::Fear => &[
            "ambient", "electronic", "instrumental", "classical", "downtempo", "trip-hop",
            "dark-ambient",
        ],
        Emotion::Surprise => &[
            "electronic", "edm", "indie", "alternative", "experimental", "progressive",
            "indie-rock",
        ],
        Emotion::Neutral => &[
            "indie", "alternative", "rock", "pop", "jazz", "chill", "lo-fi", "study",
        ],
    }
}

/// Target of one tunable feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureTarget {
    pub feature: AudioFeature,
    pub min: f64,
    pub max: f64,
    pub target: f64,
}

/// Audio feature targets for the Spotify recommendations endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioParams {
    pub emotion: Emotion,
    pub features: Vec<FeatureTarget>,
    pub target_mode: Option<u8>,
}

impl AudioParams {
    pub fn target(&self, feature: AudioFeature) -> Option<f64> {
        if feature == AudioFeature::Mode {
            return self.target_mode.map(f64::from);
        }
        self.features
            .iter()
            .find(|t| t.feature == feature)
            .map(|t| t.target)
    }

    /// `target_x`/`min_x`/`max_x` pairs as accepted by the Spotify API
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.features.len() * 3 + 1);
        for t in &self.features {
            let name = t.feature.name();
            params.push((format!("target_{}", name), t.target.to_string()));
            params.push((format!("min_{}", name), t.min.to_string()));
            params.push((format!("max_{}", name), t.max.to_string()));
        }
        if let Some(mode) = self.target_mode {
            params.push(("target_mode".to_string(), mode.to_string()));
        }
        params
    }
}

/// Sentiment polarity (-1..1) mapped onto valence (0..1)
pub fn sentiment_valence(sentiment: f64) -> f64 {
    (sentiment + 1.0) / 2.0
}

/// Audio feature targets for an emotion, with valence nudged by sentiment
///
/// Range features target their midpoint. The valence target blends the
/// emotion's valence midpoint (70%) with the sentiment valence (30%).
pub fn emotion_to_audio_params(emotion: Emotion, sentiment: f64) -> AudioParams {
    let profile = audio_profile(emotion);
    let sentiment_valence = sentiment_valence(sentiment);

    let features = profile
        .ranges
        .iter()
        .map(|range| {
            let target = if range.feature == AudioFeature::Valence {
                range.midpoint() * EMOTION_VALENCE_WEIGHT
                    + sentiment_valence * SENTIMENT_VALENCE_WEIGHT
            } else {
                range.midpoint()
            };
            FeatureTarget {
                feature: range.feature,
                min: range.min,
                max: range.max,
                target,
            }
        })
        .collect();

    AudioParams {
        emotion,
        features,
        target_mode: profile.mode,
    }
}

/// First `limit` genres associated with an emotion
pub fn emotion_to_genres(emotion: Emotion, limit: usize) -> Vec<&'static str> {
    genres_for(emotion).iter().take(limit).copied().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intensity {
    High,
    Medium,
    Low,
}

impl Intensity {
    fn from_sentiment(sentiment: f64) -> Self {
        let magnitude = sentiment.abs();
        if magnitude > 0.6 {
            Intensity::High
        } else if magnitude > 0.3 {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }
}

/// Short mood phrase, e.g. "happy and upbeat"
pub fn mood_description(emotion: Emotion, sentiment: f64) -> &'static str {
    use Intensity::*;

    match (emotion, Intensity::from_sentiment(sentiment)) {
        (Emotion::Joy, High) => "ecstatic and euphoric",
        (Emotion::Joy, Medium) => "happy and upbeat",
        (Emotion::Joy, Low) => "contentedly cheerful",
        (Emotion::Sadness, High) => "deeply melancholic",
        (Emotion::Sadness, Medium) => "bittersweet and reflective",
        (Emotion::Sadness, Low) => "wistfully contemplative",
        (Emotion::Anger, High) => "intensely aggressive",
        (Emotion::Anger, Medium) => "frustrated and energetic",
        (Emotion::Anger, Low) => "mildly irritated",
        (Emotion::Fear, High) => "anxiously tense",
        (Emotion::Fear, Medium) => "nervously uncertain",
        (Emotion::Fear, Low) => "cautiously aware",
        (Emotion::Surprise, High) => "excitedly astonished",
        (Emotion::Surprise, Medium) => "pleasantly unexpected",
        (Emotion::Surprise, Low) => "mildly curious",
        (Emotion::Neutral, High) => "balanced and steady",
        (Emotion::Neutral, Medium) => "casually relaxed",
        (Emotion::Neutral, Low) => "calmly centered",
    }
}
