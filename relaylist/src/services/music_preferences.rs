//! User music preferences
//!
//! Three ways for a user to express taste: picking genres, using their
//! Spotify listening history, or naming favourite artists and songs.
//! Preferences are combined with a chat analysis into the parameters the
//! recommender works from.

use crate::models::{ChatAnalysis, Emotion};
use crate::services::emotion_mapper::sentiment_valence;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Genres offered for selection
pub const GENRES: &[&str] = &[
    // Popular
    "pop", "rock", "hip-hop", "r&b", "country", "electronic", "dance",
    // Electronic
    "edm", "house", "techno", "dubstep", "drum-and-bass", "trance",
    // Rock
    "indie-rock", "alternative", "punk", "metal", "hard-rock", "classic-rock",
    // Hip-hop
    "rap", "trap", "lo-fi", "boom-bap",
    // Jazz & blues
    "jazz", "blues", "soul", "funk",
    // Latin
    "reggaeton", "latin", "salsa", "bachata",
    // Other
    "folk", "acoustic", "indie", "classical", "k-pop", "j-pop", "reggae", "ska", "gospel",
    "ambient", "chill", "study",
];

pub const MAX_GENRES: usize = 5;
pub const MAX_SEEDS: usize = 3;

pub fn is_known_genre(genre: &str) -> bool {
    GENRES.contains(&genre)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Chill,
    Romantic,
    Angry,
    Focused,
}

impl Mood {
    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["pop", "dance", "funk", "disco", "reggae"],
            Mood::Sad => &["indie", "acoustic", "blues", "r&b", "soul"],
            Mood::Energetic => &["edm", "rock", "hip-hop", "metal", "drum-and-bass"],
            Mood::Chill => &["lo-fi", "ambient", "jazz", "acoustic", "indie"],
            Mood::Romantic => &["r&b", "soul", "indie", "pop", "acoustic"],
            Mood::Angry => &["metal", "punk", "hard-rock", "rap", "dubstep"],
            Mood::Focused => &["classical", "ambient", "lo-fi", "study", "jazz"],
        }
    }

    pub fn from_emotion(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Joy => Mood::Happy,
            Emotion::Sadness => Mood::Sad,
            Emotion::Anger => Mood::Angry,
            Emotion::Fear => Mood::Focused,
            Emotion::Surprise => Mood::Energetic,
            Emotion::Neutral => Mood::Chill,
        }
    }
}

/// Genres suited to a conversation's dominant emotion
pub fn genre_suggestions_from_emotion(emotion: Emotion) -> Vec<String> {
    Mood::from_emotion(emotion)
        .genres()
        .iter()
        .map(|g| g.to_string())
        .collect()
}

/// Target energy for each dominant emotion
pub fn emotion_energy(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Joy => 0.7,
        Emotion::Sadness => 0.3,
        Emotion::Anger => 0.85,
        Emotion::Fear => 0.5,
        Emotion::Surprise => 0.75,
        Emotion::Neutral => 0.5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnergyPreference {
    #[serde(rename = "Very Calm")]
    VeryCalm,
    Calm,
    #[default]
    Moderate,
    Energetic,
    #[serde(rename = "Very Energetic")]
    VeryEnergetic,
}

impl EnergyPreference {
    /// Shift applied to the emotion's target energy
    pub fn offset(&self) -> f64 {
        match self {
            EnergyPreference::VeryCalm => -0.2,
            EnergyPreference::Calm => -0.1,
            EnergyPreference::Moderate => 0.0,
            EnergyPreference::Energetic => 0.1,
            EnergyPreference::VeryEnergetic => 0.2,
        }
    }
}

/// Listening history window for profile-based recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// About the last 4 weeks
    ShortTerm,
    /// About the last 6 months
    #[default]
    MediumTerm,
    /// All time
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_popularity_range() -> (u32, u32) {
    (20, 100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreSelection {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_true")]
    pub explicit_allowed: bool,
    #[serde(default = "default_popularity_range")]
    pub popularity_range: (u32, u32),
    #[serde(default)]
    pub energy_preference: EnergyPreference,
}

impl Default for GenreSelection {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            explicit_allowed: true,
            popularity_range: default_popularity_range(),
            energy_preference: EnergyPreference::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyProfile {
    #[serde(default)]
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedInput {
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
}

/// How the user chose to express their taste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MusicPreferences {
    GenreSelection(GenreSelection),
    SpotifyProfile(SpotifyProfile),
    SeedInput(SeedInput),
}

impl Default for MusicPreferences {
    fn default() -> Self {
        MusicPreferences::GenreSelection(GenreSelection::default())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Invalid popularity range {0}-{1}: expected 0 <= min <= max <= 100")]
    InvalidPopularityRange(u32, u32),
}

fn clean_entries(entries: Vec<String>, limit: usize, what: &str) -> Vec<String> {
    let mut cleaned: Vec<String> = entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if cleaned.len() > limit {
        warn!("{} {} given, keeping the first {}", cleaned.len(), what, limit);
        cleaned.truncate(limit);
    }
    cleaned
}

impl MusicPreferences {
    pub fn method(&self) -> &'static str {
        match self {
            MusicPreferences::GenreSelection(_) => "genre_selection",
            MusicPreferences::SpotifyProfile(_) => "spotify_profile",
            MusicPreferences::SeedInput(_) => "seed_input",
        }
    }

    /// User popularity range, only set for genre selection
    pub fn popularity_range(&self) -> Option<(u32, u32)> {
        match self {
            MusicPreferences::GenreSelection(g) => Some(g.popularity_range),
            _ => None,
        }
    }

    /// Check and normalize user input
    ///
    /// Genres are lowercased and deduplicated, blank seeds dropped, and
    /// lists beyond their limit truncated with a warning.
    pub fn validate(self) -> Result<Self, PreferenceError> {
        match self {
            MusicPreferences::GenreSelection(mut selection) => {
                let mut genres: Vec<String> = Vec::new();
                for genre in selection.genres {
                    let genre = genre.trim().to_lowercase();
                    if genre.is_empty() || genres.contains(&genre) {
                        continue;
                    }
                    if !is_known_genre(&genre) {
                        return Err(PreferenceError::UnknownGenre(genre));
                    }
                    genres.push(genre);
                }
                selection.genres = clean_entries(genres, MAX_GENRES, "genres");

                let (min, max) = selection.popularity_range;
                if min > max || max > 100 {
                    return Err(PreferenceError::InvalidPopularityRange(min, max));
                }

                Ok(MusicPreferences::GenreSelection(selection))
            }
            MusicPreferences::SpotifyProfile(profile) => {
                Ok(MusicPreferences::SpotifyProfile(profile))
            }
            MusicPreferences::SeedInput(seeds) => Ok(MusicPreferences::SeedInput(SeedInput {
                artists: clean_entries(seeds.artists, MAX_SEEDS, "artists"),
                tracks: clean_entries(seeds.tracks, MAX_SEEDS, "tracks"),
            })),
        }
    }
}

/// Everything the recommender needs from preferences and analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationParams {
    /// `None` when Spotify's profile-based engine picks the genres
    pub genres: Option<Vec<String>>,
    pub target_valence: f64,
    pub target_energy: f64,
    pub dominant_emotion: Emotion,
    pub sentiment_score: f64,
    pub method: &'static str,
}

/// Combine user preferences with the conversation's mood
pub fn combine_with_analysis(
    prefs: &MusicPreferences,
    analysis: &ChatAnalysis,
) -> RecommendationParams {
    let emotion = analysis.emotions.dominant;
    let sentiment = analysis.sentiment.average_polarity;
    let emotion_genres = genre_suggestions_from_emotion(emotion);

    let (genres, energy_offset) = match prefs {
        MusicPreferences::GenreSelection(selection) => {
            let genres = if selection.genres.is_empty() {
                emotion_genres
            } else {
                selection.genres.clone()
            };
            (Some(genres), selection.energy_preference.offset())
        }
        MusicPreferences::SpotifyProfile(_) => (None, 0.0),
        MusicPreferences::SeedInput(_) => (Some(emotion_genres), 0.0),
    };

    RecommendationParams {
        genres,
        target_valence: sentiment_valence(sentiment),
        target_energy: (emotion_energy(emotion) + energy_offset).clamp(0.0, 1.0),
        dominant_emotion: emotion,
        sentiment_score: sentiment,
        method: prefs.method(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chat_analyzer::test_support::msg;
    use crate::services::chat_analyzer::ChatAnalyzer;

    fn sad_analysis() -> ChatAnalysis {
        ChatAnalyzer::new()
            .analyze(&[msg("2024-01-01 10:00", "so sad, I miss you, this is terrible")])
            .unwrap()
    }

    #[test]
    fn test_catalog_size() {
        assert_eq!(GENRES.len(), 43);
        assert!(is_known_genre("drum-and-bass"));
        assert!(!is_known_genre("polka"));
    }

    #[test]
    fn test_deserialize_tagged_with_defaults() {
        let prefs: MusicPreferences =
            serde_json::from_str(r#"{"method": "genre_selection", "genres": ["jazz"]}"#).unwrap();

        match prefs {
            MusicPreferences::GenreSelection(g) => {
                assert_eq!(g.genres, vec!["jazz"]);
                assert!(g.explicit_allowed);
                assert_eq!(g.popularity_range, (20, 100));
                assert_eq!(g.energy_preference, EnergyPreference::Moderate);
            }
            other => panic!("unexpected {:?}", other),
        }

        let prefs: MusicPreferences =
            serde_json::from_str(r#"{"method": "spotify_profile"}"#).unwrap();
        assert_eq!(
            prefs,
            MusicPreferences::SpotifyProfile(SpotifyProfile { time_range: TimeRange::MediumTerm })
        );

        let prefs: MusicPreferences = serde_json::from_str(
            r#"{"method": "genre_selection", "energy_preference": "Very Calm"}"#,
        )
        .unwrap();
        assert_eq!(prefs.method(), "genre_selection");
    }

    #[test]
    fn test_validate_genres() {
        let prefs = MusicPreferences::GenreSelection(GenreSelection {
            genres: vec![
                "Jazz".into(),
                "rock".into(),
                "jazz".into(),
                "pop".into(),
                "funk".into(),
                "soul".into(),
                "metal".into(),
            ],
            ..Default::default()
        });

        match prefs.validate().unwrap() {
            MusicPreferences::GenreSelection(g) => {
                assert_eq!(g.genres, vec!["jazz", "rock", "pop", "funk", "soul"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_unknown_genre_and_bad_range() {
        let prefs = MusicPreferences::GenreSelection(GenreSelection {
            genres: vec!["polka".into()],
            ..Default::default()
        });
        assert_eq!(prefs.validate(), Err(PreferenceError::UnknownGenre("polka".into())));

        let prefs = MusicPreferences::GenreSelection(GenreSelection {
            popularity_range: (80, 20),
            ..Default::default()
        });
        assert_eq!(prefs.validate(), Err(PreferenceError::InvalidPopularityRange(80, 20)));
    }

    #[test]
    fn test_validate_seeds() {
        let prefs = MusicPreferences::SeedInput(SeedInput {
            artists: vec![" Radiohead ".into(), "".into(), "Bjork".into()],
            tracks: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        });

        match prefs.validate().unwrap() {
            MusicPreferences::SeedInput(s) => {
                assert_eq!(s.artists, vec!["Radiohead", "Bjork"]);
                assert_eq!(s.tracks.len(), 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_suggestions_follow_mood() {
        assert_eq!(
            genre_suggestions_from_emotion(Emotion::Fear),
            vec!["classical", "ambient", "lo-fi", "study", "jazz"]
        );
        assert_eq!(genre_suggestions_from_emotion(Emotion::Neutral)[0], "lo-fi");
    }

    #[test]
    fn test_combine_genre_selection() {
        let analysis = sad_analysis();
        let prefs = MusicPreferences::GenreSelection(GenreSelection {
            genres: vec!["jazz".into()],
            energy_preference: EnergyPreference::Calm,
            ..Default::default()
        });

        let params = combine_with_analysis(&prefs, &analysis);

        assert_eq!(params.dominant_emotion, Emotion::Sadness);
        assert_eq!(params.genres, Some(vec!["jazz".to_string()]));
        assert!((params.target_energy - 0.2).abs() < 1e-9);
        assert!(params.target_valence < 0.5);
        assert_eq!(params.method, "genre_selection");
    }

    #[test]
    fn test_combine_without_genres_uses_emotion() {
        let analysis = sad_analysis();

        let params = combine_with_analysis(&MusicPreferences::default(), &analysis);
        assert_eq!(params.genres.as_deref().map(|g| g[0].as_str()), Some("indie"));

        let params = combine_with_analysis(
            &MusicPreferences::SpotifyProfile(SpotifyProfile::default()),
            &analysis,
        );
        assert_eq!(params.genres, None);
        assert!((params.target_energy - 0.3).abs() < 1e-9);
    }
}
