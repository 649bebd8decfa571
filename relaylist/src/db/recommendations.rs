//! Recommendation persistence

use crate::models::RecommendedTrack;
use crate::services::spotify::AudioFeatures;
use relaylist_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// A recommendation row as cached for a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecommendation {
    pub track_id: String,
    pub track_name: String,
    pub artist: String,
    pub album: Option<String>,
    pub spotify_url: Option<String>,
    pub relevance_score: f64,
    pub audio_features: Option<AudioFeatures>,
    pub reason: Option<String>,
    pub popularity: Option<i64>,
    pub duration_ms: Option<i64>,
}

/// Replace the recommendations of a session
pub async fn save_recommendations(
    pool: &SqlitePool,
    session_id: i64,
    tracks: &[RecommendedTrack],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM recommendations WHERE session_id = ?")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

    for track in tracks {
        let features = track
            .audio_features
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO recommendations
                (session_id, track_id, track_name, artist, spotify_url, relevance_score,
                 audio_features, recommendation_reason, album, popularity, duration_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(&track.id)
        .bind(&track.name)
        .bind(&track.artist)
        .bind(&track.spotify_url)
        .bind(track.relevance_score)
        .bind(features)
        .bind(&track.reason)
        .bind(&track.album)
        .bind(track.popularity as i64)
        .bind(track.duration_ms as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(session_id, count = tracks.len(), "Saved recommendations");
    Ok(())
}

/// Recommendations of a session, most relevant first
pub async fn get_recommendations(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<Vec<StoredRecommendation>> {
    let rows = sqlx::query(
        r#"
        SELECT track_id, track_name, artist, album, spotify_url, relevance_score,
               audio_features, recommendation_reason, popularity, duration_ms
        FROM recommendations
        WHERE session_id = ?
        ORDER BY relevance_score DESC, id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let features: Option<String> = row.get("audio_features");
            let audio_features = features
                .map(|json| serde_json::from_str::<AudioFeatures>(&json))
                .transpose()
                .map_err(|e| Error::Internal(format!("Corrupt audio_features column: {}", e)))?;

            Ok(StoredRecommendation {
                track_id: row.get("track_id"),
                track_name: row.get("track_name"),
                artist: row.get("artist"),
                album: row.get("album"),
                spotify_url: row.get("spotify_url"),
                relevance_score: row.get("relevance_score"),
                audio_features,
                reason: row.get("recommendation_reason"),
                popularity: row.get("popularity"),
                duration_ms: row.get("duration_ms"),
            })
        })
        .collect()
}
