//! Spotify OAuth
//!
//! Authorization-code flow for user access (top items, playlists) and the
//! client-credentials flow for catalog calls made before anyone logs in.
//! User tokens are persisted so a restart does not require a new login.

use super::models::TokenResponse;
use super::SpotifyError;
use crate::db::tokens;
use chrono::{DateTime, Duration, Utc};
use relaylist_common::config::SpotifyCredentials;
use relaylist_common::db::StoredToken;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Scopes requested at login
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "user-top-read",
    "user-read-recently-played",
    "user-library-read",
    "user-library-modify",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-follow-read",
    "user-follow-modify",
];

/// Tokens are refreshed this long before they expire
const EXPIRY_SKEW_SECS: i64 = 60;

/// Login attempts must complete within this window
const STATE_TTL_SECS: i64 = 600;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
}

impl TokenSet {
    fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + Duration::seconds(response.expires_in),
            scope: response.scope,
        }
    }

    /// True when the token expires within the refresh skew
    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(EXPIRY_SKEW_SECS)
    }

    pub fn to_stored(&self) -> StoredToken {
        StoredToken {
            user_id: None,
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_expiry: self.expires_at.to_rfc3339(),
            scope: self.scope.clone(),
        }
    }

    pub fn from_stored(stored: &StoredToken) -> Option<Self> {
        let expires_at = DateTime::parse_from_rfc3339(&stored.token_expiry)
            .ok()?
            .with_timezone(&Utc);
        Some(Self {
            access_token: stored.access_token.clone(),
            refresh_token: stored.refresh_token.clone(),
            expires_at,
            scope: stored.scope.clone(),
        })
    }
}

/// Holds application credentials and the current tokens
pub struct SpotifyAuth {
    credentials: SpotifyCredentials,
    http: reqwest::Client,
    accounts_url: String,
    store: Option<SqlitePool>,
    user_token: RwLock<Option<TokenSet>>,
    app_token: RwLock<Option<TokenSet>>,
    /// OAuth `state` values handed out and not yet used
    pending_states: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SpotifyAuth {
    pub fn new(credentials: SpotifyCredentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            store: None,
            user_token: RwLock::new(None),
            app_token: RwLock::new(None),
            pending_states: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Persist user tokens in (and restore them from) this database
    pub fn with_store(mut self, pool: SqlitePool) -> Self {
        self.store = Some(pool);
        self
    }

    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }

    /// Load a previously stored user token, if any
    pub async fn restore(&self) -> Result<bool, SpotifyError> {
        let Some(pool) = &self.store else {
            return Ok(false);
        };

        match tokens::load_user_token(pool).await? {
            Some(stored) => match TokenSet::from_stored(&stored) {
                Some(token) => {
                    *self.user_token.write().await = Some(token);
                    info!("✓ Restored Spotify login");
                    Ok(true)
                }
                None => {
                    warn!("Stored Spotify token has an invalid expiry, ignoring it");
                    Ok(false)
                }
            },
            None => Ok(false),
        }
    }

    /// Build the login URL and remember its CSRF state
    pub async fn authorize_url(&self) -> String {
        let state = Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        {
            let mut pending = self.pending_states.lock().await;
            pending.retain(|_, issued| now - *issued < Duration::seconds(STATE_TTL_SECS));
            pending.insert(state.clone(), now);
        }

        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.accounts_url,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
            state
        )
    }

    /// Consume a state returned to the callback
    pub async fn validate_state(&self, state: &str) -> Result<(), SpotifyError> {
        let issued = self.pending_states.lock().await.remove(state);
        match issued {
            Some(issued) if Utc::now() - issued < Duration::seconds(STATE_TTL_SECS) => Ok(()),
            _ => Err(SpotifyError::InvalidState),
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            let body = response.text().await.unwrap_or_default();
            warn!("Spotify token request rejected ({}): {}", status, body);
            return Err(SpotifyError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    async fn store_user_token(&self, token: TokenSet) -> Result<(), SpotifyError> {
        if let Some(pool) = &self.store {
            tokens::save_user_token(pool, &token.to_stored()).await?;
        }
        *self.user_token.write().await = Some(token);
        Ok(())
    }

    /// Exchange an authorization code for user tokens
    pub async fn exchange_code(&self, code: &str) -> Result<(), SpotifyError> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .await?;

        self.store_user_token(TokenSet::from_response(response, Utc::now()))
            .await?;
        info!("✓ Spotify login complete");
        Ok(())
    }

    async fn refresh(&self, current: &TokenSet) -> Result<String, SpotifyError> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(SpotifyError::NotAuthenticated)?;

        debug!("Refreshing Spotify user token");
        let response = self
            .request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await?;

        let mut token = TokenSet::from_response(response, Utc::now());
        // Spotify may omit the refresh token; the old one stays valid
        if token.refresh_token.is_none() {
            token.refresh_token = current.refresh_token.clone();
        }
        let access = token.access_token.clone();
        self.store_user_token(token).await?;
        Ok(access)
    }

    pub async fn is_user_authenticated(&self) -> bool {
        self.user_token.read().await.is_some()
    }

    /// Valid user access token, refreshed when close to expiry
    pub async fn user_access_token(&self) -> Result<String, SpotifyError> {
        let current = self
            .user_token
            .read()
            .await
            .clone()
            .ok_or(SpotifyError::NotAuthenticated)?;

        if current.is_expiring(Utc::now()) {
            self.refresh(&current).await
        } else {
            Ok(current.access_token)
        }
    }

    /// Application token from the client-credentials flow
    pub async fn app_access_token(&self) -> Result<String, SpotifyError> {
        if let Some(token) = self.app_token.read().await.as_ref() {
            if !token.is_expiring(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .request_token(&[("grant_type", "client_credentials")])
            .await?;
        let token = TokenSet::from_response(response, Utc::now());
        let access = token.access_token.clone();
        *self.app_token.write().await = Some(token);
        Ok(access)
    }

    /// User token when logged in, otherwise the application token
    pub async fn access_token(&self) -> Result<String, SpotifyError> {
        if self.is_user_authenticated().await {
            match self.user_access_token().await {
                Ok(token) => return Ok(token),
                Err(e) => warn!("User token unavailable, using app token: {}", e),
            }
        }
        self.app_access_token().await
    }

    /// Forget the user login (and its stored copy)
    pub async fn logout(&self) -> Result<(), SpotifyError> {
        if let Some(pool) = &self.store {
            tokens::clear_user_token(pool).await?;
        }
        *self.user_token.write().await = None;
        Ok(())
    }
}
