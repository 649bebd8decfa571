//! Database models

use serde::{Deserialize, Serialize};

/// Row of the session history listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionSummary {
    pub id: i64,
    pub filename: String,
    pub contact_name: Option<String>,
    pub upload_date: String,
    pub message_count: i64,
}

/// Persisted Spotify user token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredToken {
    pub user_id: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// RFC 3339 expiry timestamp
    pub token_expiry: String,
    pub scope: Option<String>,
}
