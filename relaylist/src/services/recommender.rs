//! Playlist generation
//!
//! Combines a chat analysis with the user's preferences and asks the music
//! catalog for tracks. Genre selection searches the catalog with mood
//! terms; profile and seed methods use the recommendations endpoint and
//! score each result against the conversation's emotion.

use crate::models::{AudioFeature, ChatAnalysis, Emotion, RecommendedTrack};
use crate::services::emotion_mapper::{sentiment_valence, FeatureRange};
use crate::services::music_preferences::{
    genre_suggestions_from_emotion, MusicPreferences, SeedInput, TimeRange,
};
use crate::services::spotify::{
    AudioFeatures, MusicCatalog, RecommendationRequest, SpotifyError, Track,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_LIMIT: usize = 20;

/// Genres searched by the genre method
const SEARCH_GENRES: usize = 3;
/// Mood terms combined with each genre
const TERMS_PER_GENRE: usize = 2;
/// Results requested per search query
const SEARCH_RESULTS: u32 = 5;

const TOP_ITEMS: u32 = 5;
const PROFILE_SEEDS_EACH: usize = 2;
const MAX_ARTIST_SEEDS: usize = 2;
const MAX_TRACK_SEEDS: usize = 3;

/// Relevance given to searched tracks whose audio features are unknown
const SEARCH_DEFAULT_RELEVANCE: f64 = 0.7;
/// Relevance given to recommended tracks whose audio features are unknown
const UNSCORED_RELEVANCE: f64 = 0.5;

const EMOTION_WEIGHT: f64 = 0.6;
const POPULARITY_WEIGHT: f64 = 0.4;

use AudioFeature::{Acousticness, Danceability, Energy, Instrumentalness, Loudness, Tempo, Valence};

const fn range(feature: AudioFeature, min: f64, max: f64) -> FeatureRange {
    FeatureRange { feature, min, max }
}

const JOY_TARGETS: &[FeatureRange] = &[
    range(Valence, 0.6, 1.0),
    range(Energy, 0.5, 0.9),
    range(Danceability, 0.5, 1.0),
    range(Acousticness, 0.0, 0.5),
];
const SADNESS_TARGETS: &[FeatureRange] = &[
    range(Valence, 0.0, 0.4),
    range(Energy, 0.2, 0.5),
    range(Acousticness, 0.3, 1.0),
    range(Instrumentalness, 0.0, 0.7),
];
const ANGER_TARGETS: &[FeatureRange] = &[
    range(Valence, 0.0, 0.5),
    range(Energy, 0.7, 1.0),
    range(Loudness, -5.0, 0.0),
    range(Tempo, 120.0, 180.0),
];
const SURPRISE_TARGETS: &[FeatureRange] = &[
    range(Valence, 0.4, 0.8),
    range(Energy, 0.6, 0.9),
    range(Danceability, 0.4, 0.8),
];
const NEUTRAL_TARGETS: &[FeatureRange] = &[range(Valence, 0.4, 0.6), range(Energy, 0.4, 0.6)];

/// Feature ranges tracks are scored against
pub fn scoring_targets(emotion: Emotion) -> &'static [FeatureRange] {
    match emotion {
        Emotion::Joy => JOY_TARGETS,
        Emotion::Sadness => SADNESS_TARGETS,
        Emotion::Anger => ANGER_TARGETS,
        Emotion::Surprise => SURPRISE_TARGETS,
        Emotion::Fear | Emotion::Neutral => NEUTRAL_TARGETS,
    }
}

fn search_terms(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &["happy", "upbeat", "cheerful", "positive"],
        Emotion::Sadness => &["sad", "melancholy", "emotional", "heartbreak"],
        Emotion::Anger => &["intense", "aggressive", "powerful", "energy"],
        Emotion::Surprise => &["exciting", "dynamic", "unexpected"],
        Emotion::Fear | Emotion::Neutral => &["chill", "relaxed", "calm", "smooth"],
    }
}

/// How well one feature value fits its target range, 0..1
///
/// Inside the range scores 1. Outside, ratio features lose the distance
/// relative to the room left between the range and the 0/1 bound; tempo
/// and loudness lose the gap relative to the range width.
pub fn feature_score(target: &FeatureRange, value: f64) -> f64 {
    if target.contains(value) {
        return 1.0;
    }

    let distance = if target.feature.is_unit_interval() {
        if value < target.min {
            if target.min != 0.0 {
                (target.min - value) / target.min
            } else {
                1.0
            }
        } else if target.max != 1.0 {
            (value - target.max) / (1.0 - target.max)
        } else {
            1.0
        }
    } else {
        let width = target.max - target.min;
        let gap = if value < target.min {
            target.min - value
        } else {
            value - target.max
        };
        if width > 0.0 {
            gap / width
        } else {
            1.0
        }
    };

    (1.0 - distance).clamp(0.0, 1.0)
}

/// Mean feature score of a track against the emotion's targets
pub fn emotion_match_score(emotion: Emotion, features: &AudioFeatures) -> f64 {
    let targets = scoring_targets(emotion);
    if targets.is_empty() {
        return 0.5;
    }
    let total: f64 = targets
        .iter()
        .map(|t| feature_score(t, features.value(t.feature)))
        .sum();
    total / targets.len() as f64
}

/// Popularity fit: inside the user's range scores 1 (else 0.5); without a
/// range, moderately popular tracks (around 60) score highest
pub fn popularity_score(popularity: u32, range: Option<(u32, u32)>) -> f64 {
    match range {
        Some((min, max)) => {
            if (min..=max).contains(&popularity) {
                1.0
            } else {
                0.5
            }
        }
        None => 1.0 - (f64::from(popularity) - 60.0).abs() / 60.0,
    }
}

/// Human-readable explanation of a score
pub fn recommendation_reason(emotion: Emotion, features: &AudioFeatures, score: f64) -> String {
    let mut reasons = Vec::new();
    match emotion {
        Emotion::Joy if features.valence > 0.6 => reasons.push("upbeat and positive vibe"),
        Emotion::Sadness if features.valence < 0.4 => reasons.push("melancholic tone"),
        Emotion::Anger if features.energy > 0.7 => reasons.push("high energy and intensity"),
        _ => {}
    }

    if score > 0.8 {
        if reasons.is_empty() {
            "Perfect emotional match".to_string()
        } else {
            format!("Perfect match - {}", reasons.join(", "))
        }
    } else if score > 0.6 {
        if reasons.is_empty() {
            "Strong emotional match".to_string()
        } else {
            format!("Great match - {}", reasons.join(", "))
        }
    } else {
        "Matches your conversation's mood".to_string()
    }
}

/// Catalog track → recommendation awaiting a score
fn format_track(track: Track, genre_source: &str, emotion: Emotion) -> RecommendedTrack {
    RecommendedTrack {
        artist: track.artist_names(),
        image_url: track.image_url(),
        id: track.id,
        name: track.name,
        album: track.album.name,
        spotify_url: track.external_urls.spotify,
        preview_url: track.preview_url,
        duration_ms: track.duration_ms,
        popularity: track.popularity,
        explicit: track.explicit,
        genre_source: genre_source.to_string(),
        emotion_match: emotion,
        relevance_score: 0.0,
        emotion_match_score: None,
        audio_features: None,
        reason: String::new(),
    }
}

fn sort_and_truncate(mut tracks: Vec<RecommendedTrack>, limit: usize) -> Vec<RecommendedTrack> {
    tracks.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    tracks.truncate(limit);
    tracks
}

pub struct MusicRecommender {
    catalog: Arc<dyn MusicCatalog>,
}

impl MusicRecommender {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }

    /// Recommend up to `limit` tracks for a conversation
    ///
    /// An empty list means the catalog had nothing matching; a catalog
    /// failure is returned as an error.
    pub async fn generate(
        &self,
        analysis: &ChatAnalysis,
        prefs: &MusicPreferences,
        limit: usize,
    ) -> Result<Vec<RecommendedTrack>, SpotifyError> {
        let emotion = analysis.emotions.dominant;
        let sentiment = analysis.sentiment.average_polarity;

        let tracks = match prefs {
            MusicPreferences::GenreSelection(_) => {
                self.recommend_by_genre(emotion, prefs, limit).await
            }
            MusicPreferences::SpotifyProfile(profile) => {
                self.recommend_by_profile(emotion, sentiment, profile.time_range, prefs, limit)
                    .await
            }
            MusicPreferences::SeedInput(seeds) => {
                self.recommend_by_seeds(emotion, sentiment, seeds, prefs, limit)
                    .await
            }
        }?;

        info!(
            method = prefs.method(),
            emotion = %emotion,
            tracks = tracks.len(),
            "Generated recommendations"
        );
        Ok(tracks)
    }

    /// Search `"{term} {genre}"` for each genre and mood term
    async fn recommend_by_genre(
        &self,
        emotion: Emotion,
        prefs: &MusicPreferences,
        limit: usize,
    ) -> Result<Vec<RecommendedTrack>, SpotifyError> {
        let (genres, explicit_allowed) = match prefs {
            MusicPreferences::GenreSelection(selection) if !selection.genres.is_empty() => {
                (selection.genres.clone(), selection.explicit_allowed)
            }
            MusicPreferences::GenreSelection(selection) => (
                genre_suggestions_from_emotion(emotion),
                selection.explicit_allowed,
            ),
            _ => (genre_suggestions_from_emotion(emotion), true),
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut found: Vec<RecommendedTrack> = Vec::new();

        'genres: for genre in genres.iter().take(SEARCH_GENRES) {
            for term in search_terms(emotion).iter().take(TERMS_PER_GENRE) {
                let query = format!("{} {}", term, genre);
                let results = match self.catalog.search_tracks(&query, SEARCH_RESULTS).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!("Search-based recommendations failed: {}", e);
                        return Err(e);
                    }
                };

                for track in results {
                    if !explicit_allowed && track.explicit {
                        continue;
                    }
                    if seen.insert(track.id.clone()) {
                        found.push(format_track(track, genre, emotion));
                    }
                }

                if found.len() >= limit {
                    break 'genres;
                }
            }
        }

        found.truncate(limit);

        let ids: Vec<String> = found.iter().map(|t| t.id.clone()).collect();
        let features = match self.catalog.audio_features(&ids).await {
            Ok(features) => features,
            Err(e) => {
                debug!("Audio features unavailable: {}", e);
                vec![None; ids.len()]
            }
        };

        for (track, features) in found.iter_mut().zip(features) {
            track.relevance_score = match &features {
                Some(_) => f64::from(track.popularity) / 100.0,
                None => SEARCH_DEFAULT_RELEVANCE,
            };
            track.audio_features = features;
            track.reason = format!(
                "Matches {} mood and {} genre",
                emotion, track.genre_source
            );
        }

        Ok(sort_and_truncate(found, limit))
    }

    /// Seed recommendations with the user's own top artists and tracks
    async fn recommend_by_profile(
        &self,
        emotion: Emotion,
        sentiment: f64,
        time_range: TimeRange,
        prefs: &MusicPreferences,
        limit: usize,
    ) -> Result<Vec<RecommendedTrack>, SpotifyError> {
        let result: Result<Vec<Track>, SpotifyError> = async {
            let artists = self.catalog.top_artists(TOP_ITEMS, time_range).await?;
            let tracks = self.catalog.top_tracks(TOP_ITEMS, time_range).await?;

            let mut request = self.mood_request(emotion, sentiment, limit);
            request.seed_artists = artists
                .into_iter()
                .take(PROFILE_SEEDS_EACH)
                .map(|a| a.id)
                .collect();
            request.seed_tracks = tracks
                .into_iter()
                .take(PROFILE_SEEDS_EACH)
                .map(|t| t.id)
                .collect();

            if request.seed_count() == 0 {
                return Err(SpotifyError::Api {
                    status: 400,
                    message: "No listening history to seed from".to_string(),
                });
            }

            self.catalog.recommendations(&request).await
        }
        .await;

        match result {
            Ok(tracks) => {
                let formatted = tracks
                    .into_iter()
                    .map(|t| format_track(t, "profile-based", emotion))
                    .collect();
                let scored = self
                    .score_tracks(formatted, emotion, prefs.popularity_range())
                    .await;
                Ok(sort_and_truncate(scored, limit))
            }
            Err(e) => {
                warn!("Profile-based recommendations failed, using genres: {}", e);
                self.recommend_by_genre(emotion, prefs, limit).await
            }
        }
    }

    /// Seed recommendations with artists and songs the user named
    async fn recommend_by_seeds(
        &self,
        emotion: Emotion,
        sentiment: f64,
        seeds: &SeedInput,
        prefs: &MusicPreferences,
        limit: usize,
    ) -> Result<Vec<RecommendedTrack>, SpotifyError> {
        let mut seed_artists = Vec::new();
        for name in &seeds.artists {
            match self
                .catalog
                .search_artists(&format!("artist:{}", name), 1)
                .await
            {
                Ok(found) => seed_artists.extend(found.into_iter().next().map(|a| a.id)),
                Err(e) => debug!("Artist lookup for {:?} failed: {}", name, e),
            }
        }

        let mut seed_tracks = Vec::new();
        for name in &seeds.tracks {
            match self.catalog.search_tracks(name, 1).await {
                Ok(found) => seed_tracks.extend(found.into_iter().next().map(|t| t.id)),
                Err(e) => debug!("Track lookup for {:?} failed: {}", name, e),
            }
        }

        if seed_artists.is_empty() && seed_tracks.is_empty() {
            info!("No seeds resolved, falling back to genre search");
            return self.recommend_by_genre(emotion, prefs, limit).await;
        }

        let mut request = self.mood_request(emotion, sentiment, limit);
        seed_artists.truncate(MAX_ARTIST_SEEDS);
        seed_tracks.truncate(MAX_TRACK_SEEDS);
        request.seed_artists = seed_artists;
        request.seed_tracks = seed_tracks;

        match self.catalog.recommendations(&request).await {
            Ok(tracks) => {
                let formatted = tracks
                    .into_iter()
                    .map(|t| format_track(t, "seed-based", emotion))
                    .collect();
                let scored = self
                    .score_tracks(formatted, emotion, prefs.popularity_range())
                    .await;
                Ok(sort_and_truncate(scored, limit))
            }
            Err(e) => {
                warn!("Seed-based recommendations failed: {}", e);
                Err(e)
            }
        }
    }

    /// Recommendation request targeting the conversation's mood
    fn mood_request(&self, emotion: Emotion, sentiment: f64, limit: usize) -> RecommendationRequest {
        let energy = scoring_targets(emotion)
            .iter()
            .find(|t| t.feature == Energy)
            .map(|t| t.midpoint())
            .unwrap_or(0.5);

        RecommendationRequest::new(limit as u32)
            .target(Valence, sentiment_valence(sentiment))
            .target(Energy, energy)
    }

    /// Score tracks by emotion fit (60%) and popularity (40%)
    async fn score_tracks(
        &self,
        mut tracks: Vec<RecommendedTrack>,
        emotion: Emotion,
        popularity_range: Option<(u32, u32)>,
    ) -> Vec<RecommendedTrack> {
        let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        let features = match self.catalog.audio_features(&ids).await {
            Ok(features) => features,
            Err(e) => {
                debug!("Audio features unavailable: {}", e);
                vec![None; ids.len()]
            }
        };

        for (track, features) in tracks.iter_mut().zip(features) {
            match features {
                Some(features) => {
                    let emotion_score = emotion_match_score(emotion, &features);
                    let pop_score = popularity_score(track.popularity, popularity_range);

                    track.relevance_score =
                        emotion_score * EMOTION_WEIGHT + pop_score * POPULARITY_WEIGHT;
                    track.emotion_match_score = Some(emotion_score);
                    track.reason = recommendation_reason(emotion, &features, emotion_score);
                    track.audio_features = Some(features);
                }
                None => {
                    track.relevance_score = UNSCORED_RELEVANCE;
                    track.reason = "Matches your conversation's mood".to_string();
                }
            }
        }

        tracks
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{track, MockCatalog};
    use super::*;
    use crate::services::chat_analyzer::test_support::msg;
    use crate::services::chat_analyzer::ChatAnalyzer;
    use crate::services::music_preferences::{GenreSelection, SpotifyProfile};
    use crate::services::spotify::Artist;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn joy_analysis() -> ChatAnalysis {
        ChatAnalyzer::new()
            .analyze(&[msg("2024-01-01 10:00", "so happy, this is awesome")])
            .unwrap()
    }

    fn features(id: &str, valence: f64, energy: f64) -> AudioFeatures {
        AudioFeatures {
            id: id.to_string(),
            valence,
            energy,
            danceability: 0.7,
            acousticness: 0.1,
            tempo: 120.0,
            loudness: -6.0,
            ..Default::default()
        }
    }

    fn genre_prefs(genres: &[&str], explicit_allowed: bool) -> MusicPreferences {
        MusicPreferences::GenreSelection(GenreSelection {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            explicit_allowed,
            ..Default::default()
        })
    }

    #[test]
    fn test_feature_score_inside_and_outside() {
        let valence = range(Valence, 0.6, 1.0);
        assert_eq!(feature_score(&valence, 0.8), 1.0);
        // 0.3 below 0.6 is half the distance to zero
        assert!(approx(feature_score(&valence, 0.3), 0.5));

        let energy = range(Energy, 0.2, 0.5);
        assert!(approx(feature_score(&energy, 0.75), 0.5));

        let zero_min = range(Valence, 0.0, 0.4);
        assert!(approx(feature_score(&zero_min, 1.0), 0.0));
    }

    #[test]
    fn test_feature_score_tempo_and_loudness_stay_in_bounds() {
        let tempo = range(Tempo, 120.0, 180.0);
        assert!(approx(feature_score(&tempo, 90.0), 0.5));
        assert_eq!(feature_score(&tempo, 400.0), 0.0);

        let loudness = range(Loudness, -5.0, 0.0);
        assert!(approx(feature_score(&loudness, -7.5), 0.5));
        assert_eq!(feature_score(&loudness, -30.0), 0.0);
    }

    #[test]
    fn test_popularity_score() {
        assert_eq!(popularity_score(50, Some((20, 100))), 1.0);
        assert_eq!(popularity_score(10, Some((20, 100))), 0.5);
        assert_eq!(popularity_score(60, None), 1.0);
        assert!(approx(popularity_score(30, None), 0.5));
        assert_eq!(popularity_score(0, None), 0.0);
    }

    #[test]
    fn test_reasons() {
        let happy = features("a", 0.9, 0.7);
        assert_eq!(
            recommendation_reason(Emotion::Joy, &happy, 0.9),
            "Perfect match - upbeat and positive vibe"
        );
        assert_eq!(recommendation_reason(Emotion::Surprise, &happy, 0.7), "Strong emotional match");
        assert_eq!(
            recommendation_reason(Emotion::Joy, &happy, 0.3),
            "Matches your conversation's mood"
        );
    }

    #[test]
    fn test_fear_scored_like_neutral() {
        let f = features("a", 0.5, 0.5);
        assert_eq!(emotion_match_score(Emotion::Fear, &f), 1.0);
        assert_eq!(
            emotion_match_score(Emotion::Fear, &f),
            emotion_match_score(Emotion::Neutral, &f)
        );
    }

    #[tokio::test]
    async fn test_genre_method_searches_terms_and_dedupes() {
        let mut catalog = MockCatalog::default();
        catalog.searches.insert(
            "happy jazz".into(),
            vec![track("a", 40, false), track("b", 90, false)],
        );
        catalog
            .searches
            .insert("upbeat jazz".into(), vec![track("b", 90, false), track("c", 10, true)]);
        catalog.features.insert("b".into(), features("b", 0.9, 0.8));

        let catalog = Arc::new(catalog);
        let recommender = MusicRecommender::new(catalog.clone());
        let tracks = recommender
            .generate(&joy_analysis(), &genre_prefs(&["jazz"], true), 10)
            .await
            .unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        // b has features → 0.9; a and c default to 0.7 and keep search order
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(approx(tracks[0].relevance_score, 0.9));
        assert!(approx(tracks[1].relevance_score, 0.7));
        assert_eq!(tracks[0].reason, "Matches joy mood and jazz genre");
        assert_eq!(tracks[0].genre_source, "jazz");

        let queries = catalog.queries.lock().unwrap().clone();
        assert_eq!(queries, vec!["happy jazz", "upbeat jazz"]);
    }

    #[tokio::test]
    async fn test_genre_method_filters_explicit_and_respects_limit() {
        let mut catalog = MockCatalog::default();
        catalog.searches.insert(
            "happy rock".into(),
            vec![track("a", 50, true), track("b", 50, false), track("c", 50, false)],
        );

        let recommender = MusicRecommender::new(Arc::new(catalog));
        let tracks = recommender
            .generate(&joy_analysis(), &genre_prefs(&["rock"], false), 1)
            .await
            .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "b");
    }

    #[tokio::test]
    async fn test_genre_method_uses_emotion_genres_when_none_selected() {
        let catalog = Arc::new(MockCatalog::default());
        let recommender = MusicRecommender::new(catalog.clone());
        let tracks = recommender
            .generate(&joy_analysis(), &genre_prefs(&[], true), 5)
            .await
            .unwrap();

        assert!(tracks.is_empty());
        let queries = catalog.queries.lock().unwrap().clone();
        // Joy → happy mood → pop, dance, funk
        assert_eq!(queries[0], "happy pop");
        assert_eq!(queries.len(), 6);
        assert_eq!(queries[5], "upbeat funk");
    }

    #[tokio::test]
    async fn test_search_failure_is_an_error() {
        let catalog = MockCatalog {
            fail_search: true,
            ..Default::default()
        };
        let recommender = MusicRecommender::new(Arc::new(catalog));
        let result = recommender
            .generate(&joy_analysis(), &genre_prefs(&["jazz"], true), 5)
            .await;
        assert!(matches!(result, Err(SpotifyError::Network(_))));
    }

    #[tokio::test]
    async fn test_nothing_found_is_an_empty_list() {
        let recommender = MusicRecommender::new(Arc::new(MockCatalog::default()));
        let tracks = recommender
            .generate(&joy_analysis(), &genre_prefs(&["jazz"], true), 5)
            .await
            .unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_profile_method_scores_and_sorts() {
        let mut catalog = MockCatalog::default();
        catalog.top_artists = vec![
            Artist { id: "ar1".into(), name: "One".into(), genres: vec![], popularity: 50 },
            Artist { id: "ar2".into(), name: "Two".into(), genres: vec![], popularity: 50 },
            Artist { id: "ar3".into(), name: "Three".into(), genres: vec![], popularity: 50 },
        ];
        catalog.top_tracks = vec![track("t1", 50, false)];
        catalog.recommended = vec![track("sad", 60, false), track("happy", 60, false), track("unknown", 60, false)];
        catalog.features.insert("happy".into(), features("happy", 0.9, 0.7));
        catalog.features.insert("sad".into(), features("sad", 0.1, 0.2));

        let catalog = Arc::new(catalog);
        let recommender = MusicRecommender::new(catalog.clone());
        let prefs = MusicPreferences::SpotifyProfile(SpotifyProfile::default());
        let tracks = recommender.generate(&joy_analysis(), &prefs, 10).await.unwrap();

        assert_eq!(tracks[0].id, "happy");
        // All joy targets met, popularity 60 → 1.0
        assert!(approx(tracks[0].relevance_score, 1.0));
        assert_eq!(tracks[0].emotion_match_score, Some(1.0));
        assert_eq!(tracks[0].genre_source, "profile-based");
        assert_eq!(tracks[0].reason, "Perfect match - upbeat and positive vibe");

        let unknown = tracks.iter().find(|t| t.id == "unknown").unwrap();
        assert_eq!(unknown.relevance_score, 0.5);
        assert!(unknown.audio_features.is_none());

        let requests = catalog.requests.lock().unwrap().clone();
        assert_eq!(requests[0].seed_artists, vec!["ar1", "ar2"]);
        assert_eq!(requests[0].seed_tracks, vec!["t1"]);
        assert!(requests[0]
            .attributes
            .contains(&("target_energy".to_string(), "0.7".to_string())));
    }

    #[tokio::test]
    async fn test_profile_failure_falls_back_to_genres() {
        let mut catalog = MockCatalog {
            fail_top: true,
            ..Default::default()
        };
        catalog
            .searches
            .insert("happy pop".into(), vec![track("p", 70, false)]);

        let recommender = MusicRecommender::new(Arc::new(catalog));
        let prefs = MusicPreferences::SpotifyProfile(SpotifyProfile::default());
        let tracks = recommender.generate(&joy_analysis(), &prefs, 5).await.unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].genre_source, "pop");
    }

    #[tokio::test]
    async fn test_seed_method_resolves_seeds() {
        let mut catalog = MockCatalog::default();
        catalog.artists.insert(
            "artist:Radiohead".into(),
            vec![Artist { id: "rh".into(), name: "Radiohead".into(), genres: vec![], popularity: 80 }],
        );
        catalog
            .searches
            .insert("Karma Police".into(), vec![track("kp", 80, false)]);
        catalog.recommended = vec![track("r1", 60, false)];

        let catalog = Arc::new(catalog);
        let recommender = MusicRecommender::new(catalog.clone());
        let prefs = MusicPreferences::SeedInput(SeedInput {
            artists: vec!["Radiohead".into(), "Nobody Known".into()],
            tracks: vec!["Karma Police".into()],
        });
        let tracks = recommender.generate(&joy_analysis(), &prefs, 5).await.unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].genre_source, "seed-based");

        let requests = catalog.requests.lock().unwrap().clone();
        assert_eq!(requests[0].seed_artists, vec!["rh"]);
        assert_eq!(requests[0].seed_tracks, vec!["kp"]);
    }

    #[tokio::test]
    async fn test_seed_method_without_seeds_falls_back() {
        let catalog = Arc::new(MockCatalog::default());
        let recommender = MusicRecommender::new(catalog.clone());
        let prefs = MusicPreferences::SeedInput(SeedInput {
            artists: vec!["Nobody".into()],
            tracks: vec![],
        });
        recommender.generate(&joy_analysis(), &prefs, 5).await.unwrap();

        assert!(catalog.requests.lock().unwrap().is_empty());
        let queries = catalog.queries.lock().unwrap().clone();
        assert_eq!(queries[0], "artist:Nobody");
        assert_eq!(queries[1], "happy pop");
    }

    #[tokio::test]
    async fn test_seed_recommendation_failure_is_an_error() {
        let mut catalog = MockCatalog {
            fail_recommendations: true,
            ..Default::default()
        };
        catalog
            .searches
            .insert("Song".into(), vec![track("s", 50, false)]);

        let recommender = MusicRecommender::new(Arc::new(catalog));
        let prefs = MusicPreferences::SeedInput(SeedInput {
            artists: vec![],
            tracks: vec!["Song".into()],
        });
        let result = recommender.generate(&joy_analysis(), &prefs, 5).await;
        assert!(matches!(result, Err(SpotifyError::Api { status: 404, .. })));
    }
}
