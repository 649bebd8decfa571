//! Conversation upload and session endpoints
//!
//! An upload is parsed, analyzed and cached in one request; later calls
//! read the cached session.

use crate::db::{self, SessionRecord};
use crate::models::{ChatAnalysis, ConversationStats, Emotion, Message};
use crate::services::emotion_mapper::{
    emotion_to_audio_params, emotion_to_genres, mood_description, AudioParams,
    DEFAULT_GENRE_LIMIT,
};
use crate::services::music_preferences::genre_suggestions_from_emotion;
use crate::services::{ChatAnalyzer, SmsParser};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use relaylist_common::db::SessionSummary;
use serde::Serialize;
use tracing::info;

/// Largest accepted CSV upload
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Multipart field carrying the CSV export
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
}

/// POST /api/sessions response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: i64,
    pub filename: String,
    pub contact: ContactInfo,
    pub statistics: Option<ConversationStats>,
    pub skipped_rows: usize,
    pub analysis: ChatAnalysis,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub session_id: i64,
    pub messages: Vec<Message>,
}

/// GET /api/sessions/:id/mood response
#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub session_id: i64,
    pub emotion: Emotion,
    pub sentiment: f64,
    pub mood_description: String,
    pub audio_params: AudioParams,
    pub genres: Vec<String>,
    pub genre_suggestions: Vec<String>,
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(upload_conversation))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/messages", get(get_messages))
        .route("/api/sessions/:id/mood", get(get_mood))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Load a session or fail with 404
pub(crate) async fn load_session(state: &AppState, session_id: i64) -> ApiResult<SessionRecord> {
    db::get_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))
}

/// Analysis of a stored session or fail with 500 when it was never written
pub(crate) fn session_analysis(session: SessionRecord) -> ApiResult<ChatAnalysis> {
    session
        .analysis
        .ok_or_else(|| ApiError::Internal(format!("Session {} has no analysis", session.id)))
}

/// POST /api/sessions
///
/// Multipart upload with the export in the `file` field.
///
/// **Errors:**
/// - 400 Bad Request: missing file, missing columns, or no readable message
pub async fn upload_conversation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("upload.csv")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = upload
        .ok_or_else(|| ApiError::BadRequest(format!("Missing '{}' field", FILE_FIELD)))?;

    let conversation = SmsParser::new().parse(bytes.as_slice())?;
    let analysis = ChatAnalyzer::new().analyze(&conversation.messages)?;

    let session_id = db::save_chat_session(&state.db, &filename, &conversation, &analysis).await?;

    info!(
        "✓ Analyzed {} ({} messages) as session {}",
        filename,
        conversation.messages.len(),
        session_id
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            session_id,
            filename,
            contact: ContactInfo {
                name: conversation.contact_name,
                phone: conversation.contact_phone,
            },
            statistics: conversation.statistics,
            skipped_rows: conversation.skipped_rows,
            analysis,
        }),
    ))
}

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<SessionListResponse>> {
    let sessions = db::list_sessions(&state.db).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<SessionRecord>> {
    Ok(Json(load_session(&state, session_id).await?))
}

/// GET /api/sessions/:id/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<MessagesResponse>> {
    if !db::sessions::session_exists(&state.db, session_id).await? {
        return Err(ApiError::NotFound(format!("Session {} not found", session_id)));
    }
    let messages = db::get_messages(&state.db, session_id).await?;
    Ok(Json(MessagesResponse {
        session_id,
        messages,
    }))
}

/// GET /api/sessions/:id/mood
///
/// Audio targets, genres and a mood phrase for the session's dominant emotion.
pub async fn get_mood(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<MoodResponse>> {
    let analysis = session_analysis(load_session(&state, session_id).await?)?;
    let emotion = analysis.emotions.dominant;
    let sentiment = analysis.sentiment.average_polarity;

    Ok(Json(MoodResponse {
        session_id,
        emotion,
        sentiment,
        mood_description: mood_description(emotion, sentiment).to_string(),
        audio_params: emotion_to_audio_params(emotion, sentiment),
        genres: emotion_to_genres(emotion, DEFAULT_GENRE_LIMIT)
            .into_iter()
            .map(str::to_string)
            .collect(),
        genre_suggestions: genre_suggestions_from_emotion(emotion),
    }))
}
