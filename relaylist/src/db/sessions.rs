//! Chat session persistence
//!
//! A session is one uploaded conversation: its metadata, the parsed
//! messages, and the analysis results (stored as JSON columns).

use crate::models::{ChatAnalysis, Message, MessageKind, ParsedConversation};
use chrono::NaiveDateTime;
use relaylist_common::db::SessionSummary;
use relaylist_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Storage format of message and session timestamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored session with its analysis
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub filename: String,
    pub upload_date: String,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub message_count: i64,
    pub sent_count: i64,
    pub received_count: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_days: i64,
    /// Missing only if the analysis row was never written
    pub analysis: Option<ChatAnalysis>,
}

/// Save a parsed conversation with its analysis
///
/// Returns the new session id. Session, messages and analysis are written
/// in one transaction.
pub async fn save_chat_session(
    pool: &SqlitePool,
    filename: &str,
    conversation: &ParsedConversation,
    analysis: &ChatAnalysis,
) -> Result<i64> {
    // Serialize before touching the database
    let emotions = serde_json::to_string(&analysis.emotions)?;
    let sentiment = serde_json::to_string(&analysis.sentiment)?;
    let topics = serde_json::to_string(&analysis.topics)?;
    let temporal = serde_json::to_string(&analysis.temporal_patterns)?;

    let stats = conversation.statistics.as_ref();
    let format_ts = |ts: &NaiveDateTime| ts.format(TIMESTAMP_FORMAT).to_string();

    let mut tx = pool.begin().await?;

    let session_id = sqlx::query(
        r#"
        INSERT INTO chat_sessions
            (filename, contact_name, contact_phone, message_count, sent_count,
             received_count, start_date, end_date, duration_days)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(filename)
    .bind(&conversation.contact_name)
    .bind(&conversation.contact_phone)
    .bind(conversation.messages.len() as i64)
    .bind(stats.map(|s| s.sent_count as i64).unwrap_or(0))
    .bind(stats.map(|s| s.received_count as i64).unwrap_or(0))
    .bind(stats.map(|s| format_ts(&s.start_date)))
    .bind(stats.map(|s| format_ts(&s.end_date)))
    .bind(stats.map(|s| s.duration_days).unwrap_or(0))
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    sqlx::query(
        r#"
        INSERT INTO analysis_results
            (session_id, emotions, sentiment, topics, temporal_patterns, summary)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session_id)
    .bind(&emotions)
    .bind(&sentiment)
    .bind(&topics)
    .bind(&temporal)
    .bind(&analysis.summary)
    .execute(&mut *tx)
    .await?;

    for (position, message) in conversation.messages.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO messages (session_id, position, timestamp, sender, kind, content)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(position as i64)
        .bind(format_ts(&message.timestamp))
        .bind(&message.sender)
        .bind(message.kind.as_str())
        .bind(&message.content)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        session_id,
        messages = conversation.messages.len(),
        "Saved chat session"
    );
    Ok(session_id)
}

fn parse_json<T: serde::de::DeserializeOwned>(column: &str, value: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| Error::Internal(format!("Corrupt {} column: {}", column, e)))
}

/// Load a session joined with its analysis
pub async fn get_session(pool: &SqlitePool, session_id: i64) -> Result<Option<SessionRecord>> {
    let row = sqlx::query(
        r#"
        SELECT cs.id, cs.filename, CAST(cs.upload_date AS TEXT) AS upload_date,
               cs.contact_name, cs.contact_phone, cs.message_count, cs.sent_count,
               cs.received_count, cs.start_date, cs.end_date, cs.duration_days,
               ar.emotions, ar.sentiment, ar.topics, ar.temporal_patterns, ar.summary
        FROM chat_sessions cs
        LEFT JOIN analysis_results ar ON cs.id = ar.session_id
        WHERE cs.id = ?
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let emotions: Option<String> = row.get("emotions");
    let analysis = match emotions {
        Some(emotions) => {
            let sentiment: String = row.get("sentiment");
            let topics: String = row.get("topics");
            let temporal: String = row.get("temporal_patterns");
            Some(ChatAnalysis {
                emotions: parse_json("emotions", &emotions)?,
                sentiment: parse_json("sentiment", &sentiment)?,
                topics: parse_json("topics", &topics)?,
                temporal_patterns: parse_json("temporal_patterns", &temporal)?,
                summary: row.get("summary"),
            })
        }
        None => None,
    };

    Ok(Some(SessionRecord {
        id: row.get("id"),
        filename: row.get("filename"),
        upload_date: row.get("upload_date"),
        contact_name: row.get("contact_name"),
        contact_phone: row.get("contact_phone"),
        message_count: row.get("message_count"),
        sent_count: row.get("sent_count"),
        received_count: row.get("received_count"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        duration_days: row.get("duration_days"),
        analysis,
    }))
}

/// All sessions, newest first
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<SessionSummary>> {
    let sessions = sqlx::query_as::<_, SessionSummary>(
        r#"
        SELECT id, filename, contact_name, CAST(upload_date AS TEXT) AS upload_date, message_count
        FROM chat_sessions
        ORDER BY upload_date DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// Messages of a session in conversation order
pub async fn get_messages(pool: &SqlitePool, session_id: i64) -> Result<Vec<Message>> {
    let rows = sqlx::query(
        r#"
        SELECT timestamp, sender, kind, content
        FROM messages
        WHERE session_id = ?
        ORDER BY position
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let timestamp: String = row.get("timestamp");
            let kind: String = row.get("kind");
            Ok(Message {
                timestamp: NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).map_err(
                    |e| Error::Internal(format!("Corrupt message timestamp {}: {}", timestamp, e)),
                )?,
                sender: row.get("sender"),
                kind: MessageKind::parse(&kind).ok_or_else(|| {
                    Error::Internal(format!("Corrupt message kind: {}", kind))
                })?,
                content: row.get("content"),
            })
        })
        .collect()
}

pub async fn session_exists(pool: &SqlitePool, session_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM chat_sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}
