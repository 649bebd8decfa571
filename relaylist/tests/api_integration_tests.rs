//! Integration tests for the Relaylist HTTP API

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use relaylist::services::music_preferences::TimeRange;
use relaylist::services::spotify::{
    Artist, AudioFeatures, MusicCatalog, Playlist, RecommendationRequest, SpotifyError, Track,
};
use relaylist::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

const CSV: &str = "Type,Date,Name / Number,Sender,Content\n\
    Received,01/05/2024 09:15,Sam (+15551234567),Sam,good morning! so happy and excited today\n\
    Sent,01/05/2024 09:20,Sam (+15551234567),,\"haha same, love this weather\"\n\
    Received,01/05/2024 21:40,Sam (+15551234567),Sam,great dinner tonight\n\
    Received,01/06/2024 18:00,Sam (+15551234567),Sam,thanks for everything\n";

const BOUNDARY: &str = "relaylist-test-boundary";

/// Catalog answering every search with the same tracks
#[derive(Default)]
struct FakeCatalog {
    tracks: Vec<Track>,
    playlists: Mutex<Vec<(String, Vec<String>)>>,
    /// Searches answer 429 while set
    rate_limited: AtomicBool,
}

impl FakeCatalog {
    fn with_tracks(count: usize) -> Self {
        let tracks = (0..count)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": format!("track{}", i),
                    "name": format!("Song {}", i),
                    "artists": [{"id": "artist1", "name": "The Testers"}],
                    "album": {"id": "album1", "name": "Fixtures", "images": []},
                    "external_urls": {"spotify": format!("https://open.spotify.com/track/track{}", i)},
                    "preview_url": null,
                    "duration_ms": 180000,
                    "popularity": 40 + i as u32,
                    "explicit": false
                }))
                .unwrap()
            })
            .collect();
        Self {
            tracks,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MusicCatalog for FakeCatalog {
    async fn search_tracks(&self, _query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        if self.rate_limited.load(Ordering::SeqCst) {
            return Err(SpotifyError::RateLimited { retry_after: Some(30) });
        }
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn search_artists(&self, _query: &str, _limit: u32) -> Result<Vec<Artist>, SpotifyError> {
        Ok(Vec::new())
    }

    async fn recommendations(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Vec<Track>, SpotifyError> {
        Ok(self.tracks.clone())
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        Ok(track_ids
            .iter()
            .map(|_| {
                Some(AudioFeatures {
                    valence: 0.8,
                    energy: 0.7,
                    ..Default::default()
                })
            })
            .collect())
    }

    async fn top_artists(
        &self,
        _limit: u32,
        _time_range: TimeRange,
    ) -> Result<Vec<Artist>, SpotifyError> {
        Err(SpotifyError::NotAuthenticated)
    }

    async fn top_tracks(
        &self,
        _limit: u32,
        _time_range: TimeRange,
    ) -> Result<Vec<Track>, SpotifyError> {
        Err(SpotifyError::NotAuthenticated)
    }

    async fn create_playlist(
        &self,
        name: &str,
        _description: &str,
        _public: bool,
        track_ids: &[String],
    ) -> Result<Playlist, SpotifyError> {
        self.playlists
            .lock()
            .unwrap()
            .push((name.to_string(), track_ids.to_vec()));
        Ok(serde_json::from_value(json!({
            "id": "playlist1",
            "name": name,
            "external_urls": {"spotify": "https://open.spotify.com/playlist/playlist1"}
        }))
        .unwrap())
    }
}

/// Test helper: app backed by a temporary database
async fn create_test_app(catalog: Option<Arc<FakeCatalog>>) -> (Router, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pool = relaylist_common::db::init_database(&temp_dir.path().join("test.db"))
        .await
        .expect("Failed to initialize database");

    let mut state = AppState::new(pool);
    if let Some(catalog) = catalog {
        state = state.with_catalog(catalog);
    }

    (relaylist::build_router(state), temp_dir)
}

fn multipart_body(field: &str, filename: &str, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        filename = filename,
        content = content
    )
}

fn upload_request(field: &str, content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, "sam.csv", content)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn upload(app: &Router) -> i64 {
    let (status, json) = send(app, upload_request("file", CSV)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "relaylist");
    assert_eq!(json["spotify_configured"], false);
}

#[tokio::test]
async fn test_root_page_is_html() {
    let (app, _dir) = create_test_app(None).await;

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_upload_analyzes_and_persists() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, upload_request("file", CSV)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["session_id"].is_i64());
    assert_eq!(json["filename"], "sam.csv");
    assert_eq!(json["contact"]["name"], "Sam");
    assert_eq!(json["contact"]["phone"], "+15551234567");
    assert_eq!(json["statistics"]["total_messages"], 4);
    assert_eq!(json["statistics"]["sent_count"], 1);
    assert_eq!(json["analysis"]["emotions"]["dominant"], "joy");
    assert!(json["analysis"]["summary"].is_string());

    let (status, list) = send(&app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(list["sessions"][0]["contact_name"], "Sam");
}

#[tokio::test]
async fn test_upload_missing_columns() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, upload_request("file", "Date,Content\n01/05/2024 09:15,hi\n")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, upload_request("attachment", CSV)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_upload_without_readable_messages() {
    let (app, _dir) = create_test_app(None).await;
    let csv = "Type,Date,Name / Number,Sender,Content\nReceived,not a date,Sam (+1555),Sam,hello\n";

    let (status, _) = send(&app, upload_request("file", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_detail_and_messages() {
    let (app, _dir) = create_test_app(None).await;
    let id = upload(&app).await;

    let (status, session) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["message_count"], 4);
    assert_eq!(session["analysis"]["emotions"]["dominant"], "joy");

    let (status, json) = send(&app, get(&format!("/api/sessions/{}/messages", id))).await;
    assert_eq!(status, StatusCode::OK);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1]["sender"], "You");
    assert_eq!(messages[1]["content"], "haha same, love this weather");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (app, _dir) = create_test_app(None).await;

    for uri in [
        "/api/sessions/99",
        "/api/sessions/99/messages",
        "/api/sessions/99/mood",
        "/api/sessions/99/recommendations",
    ] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_mood_endpoint() {
    let (app, _dir) = create_test_app(None).await;
    let id = upload(&app).await;

    let (status, json) = send(&app, get(&format!("/api/sessions/{}/mood", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emotion"], "joy");
    assert!(!json["mood_description"].as_str().unwrap().is_empty());
    assert!(!json["genres"].as_array().unwrap().is_empty());
    assert!(!json["genre_suggestions"].as_array().unwrap().is_empty());
    assert!(!json["audio_params"]["features"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendations_require_spotify() {
    let (app, _dir) = create_test_app(None).await;
    let id = upload(&app).await;

    let (status, json) = send(
        &app,
        post_json(&format!("/api/sessions/{}/recommendations", id), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_generate_and_fetch_recommendations() {
    let catalog = Arc::new(FakeCatalog::with_tracks(4));
    let (app, _dir) = create_test_app(Some(catalog)).await;
    let id = upload(&app).await;
    let uri = format!("/api/sessions/{}/recommendations", id);

    let (status, json) = send(
        &app,
        post_json(
            &uri,
            json!({
                "preferences": {"method": "genre_selection", "genres": ["Pop", "rock"]},
                "limit": 3
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["method"], "genre_selection");
    let tracks = json["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0]["genre_source"], "pop");

    let (status, stored) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let stored = stored["tracks"].as_array().unwrap();
    assert_eq!(stored.len(), 3);
    let scores: Vec<f64> = stored
        .iter()
        .map(|t| t["relevance_score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_recommendations_reject_bad_input() {
    let catalog = Arc::new(FakeCatalog::with_tracks(2));
    let (app, _dir) = create_test_app(Some(catalog)).await;
    let id = upload(&app).await;
    let uri = format!("/api/sessions/{}/recommendations", id);

    let (status, _) = send(&app, post_json(&uri, json!({"limit": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_json(&uri, json!({"limit": 51}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &app,
        post_json(
            &uri,
            json!({"preferences": {"method": "genre_selection", "genres": ["polka"]}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("polka"));
}

#[tokio::test]
async fn test_recommendations_without_body_use_defaults() {
    let catalog = Arc::new(FakeCatalog::with_tracks(2));
    let (app, _dir) = create_test_app(Some(catalog)).await;
    let id = upload(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/sessions/{}/recommendations", id))
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["method"], "genre_selection");
    assert_eq!(json["tracks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_playlist_flow() {
    let catalog = Arc::new(FakeCatalog::with_tracks(3));
    let (app, _dir) = create_test_app(Some(catalog.clone())).await;
    let id = upload(&app).await;
    let playlist_uri = format!("/api/sessions/{}/playlist", id);

    // Nothing to save yet
    let (status, json) = send(&app, post_json(&playlist_uri, json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        post_json(&format!("/api/sessions/{}/recommendations", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, post_json(&playlist_uri, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["playlist_id"], "playlist1");
    assert_eq!(json["name"], "Relaylist: Sam");
    assert_eq!(json["url"], "https://open.spotify.com/playlist/playlist1");
    assert_eq!(json["track_count"], 3);

    let playlists = catalog.playlists.lock().unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].1.len(), 3);
}

#[tokio::test]
async fn test_failed_regeneration_keeps_cached_tracks() {
    let catalog = Arc::new(FakeCatalog::with_tracks(3));
    let (app, _dir) = create_test_app(Some(catalog.clone())).await;
    let id = upload(&app).await;
    let uri = format!("/api/sessions/{}/recommendations", id);

    let (status, json) = send(&app, post_json(&uri, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tracks"].as_array().unwrap().len(), 3);

    catalog.rate_limited.store(true, Ordering::SeqCst);
    let (status, json) = send(&app, post_json(&uri, json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");

    let (status, stored) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["tracks"].as_array().unwrap().len(), 3);

    let (status, json) = send(
        &app,
        post_json(&format!("/api/sessions/{}/playlist", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["track_count"], 3);
}

#[tokio::test]
async fn test_genre_catalog() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, get("/api/genres")).await;

    assert_eq!(status, StatusCode::OK);
    let genres = json["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 43);
    assert!(genres.iter().any(|g| g == "pop"));
    assert_eq!(json["max_genres"], 5);
}

#[tokio::test]
async fn test_spotify_endpoints_without_configuration() {
    let (app, _dir) = create_test_app(None).await;

    let (status, json) = send(&app, get("/api/spotify/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["configured"], false);
    assert_eq!(json["authenticated"], false);

    let (status, _) = send(&app, get("/auth/spotify/login")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
