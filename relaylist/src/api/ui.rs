//! UI route - single HTML page for uploading and browsing sessions

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// Root page - upload form and session list
async fn root_page() -> impl IntoResponse {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Relaylist</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            border-bottom: 2px solid #1db954;
            padding-bottom: 10px;
        }
        pre {
            background: #f4f4f4;
            padding: 10px;
            overflow-x: auto;
        }
    </style>
</head>
<body>
    <h1>Relaylist</h1>
    <p>Upload an SMS conversation export (CSV) to analyze its mood and build a matching Spotify playlist.</p>

    <h2>Upload</h2>
    <form id="upload-form">
        <input type="file" name="file" accept=".csv" required>
        <button type="submit">Analyze</button>
    </form>
    <pre id="result" hidden></pre>

    <h2>Spotify</h2>
    <p id="spotify-status">Checking...</p>

    <h2>Sessions</h2>
    <ul id="sessions"></ul>

    <script>
        async function loadSessions() {
            const response = await fetch('/api/sessions');
            const data = await response.json();
            const list = document.getElementById('sessions');
            list.innerHTML = '';
            for (const s of data.sessions) {
                const item = document.createElement('li');
                const link = document.createElement('a');
                link.href = '/api/sessions/' + s.id;
                link.textContent = `${s.filename} (${s.contact_name || 'unknown'}, ${s.message_count} messages)`;
                item.appendChild(link);
                list.appendChild(item);
            }
        }

        async function loadSpotifyStatus() {
            const response = await fetch('/api/spotify/status');
            const status = await response.json();
            const el = document.getElementById('spotify-status');
            if (!status.configured) {
                el.textContent = 'Not configured (set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET).';
            } else if (status.authenticated) {
                el.textContent = 'Connected.';
            } else {
                el.innerHTML = '<a href="/auth/spotify/login">Connect your Spotify account</a>';
            }
        }

        document.getElementById('upload-form').addEventListener('submit', async (event) => {
            event.preventDefault();
            const response = await fetch('/api/sessions', {
                method: 'POST',
                body: new FormData(event.target),
            });
            const result = document.getElementById('result');
            const data = await response.json();
            result.hidden = false;
            result.textContent = response.ok
                ? data.analysis.summary
                : data.error.message;
            loadSessions();
        });

        loadSessions();
        loadSpotifyStatus();
    </script>
</body>
</html>
        "#,
    )
}
