//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `RELAYLIST_ROOT` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: the service logs a warning and
//! continues with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "RELAYLIST_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILENAME: &str = "relaylist.db";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5740;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HttpConfig {
    /// OAuth callback URL served by this instance
    pub fn callback_url(&self) -> String {
        format!("http://{}:{}/callback", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// `[spotify]` table of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Resolved Spotify application credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Default config file location: `<config_dir>/relaylist/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("relaylist").join("config.toml"))
}

/// Load the TOML config file
///
/// `path` overrides the default location. A file that does not exist yields
/// the defaults; a file that exists but does not parse is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let config_path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !config_path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    let config: TomlConfig = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed ({}): {}", config_path.display(), e))
    })?;

    info!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Resolves the root folder using the priority order above
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        default_root_folder()
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("relaylist"))
        .unwrap_or_else(|| PathBuf::from("./relaylist_data"))
}

/// Creates the root folder and locates files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILENAME)
    }
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve Spotify credentials
///
/// **Priority:** ENV (`SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`,
/// `SPOTIFY_REDIRECT_URI`) → TOML `[spotify]` table. The redirect URI
/// falls back to `default_redirect_uri`.
pub fn resolve_spotify_credentials(
    config: &TomlConfig,
    default_redirect_uri: &str,
) -> Result<SpotifyCredentials> {
    let pick = |env_name: &str, toml_value: &Option<String>| -> Option<String> {
        std::env::var(env_name)
            .ok()
            .filter(|v| is_valid_key(v))
            .or_else(|| toml_value.clone().filter(|v| is_valid_key(v)))
    };

    let client_id = pick("SPOTIFY_CLIENT_ID", &config.spotify.client_id);
    let client_secret = pick("SPOTIFY_CLIENT_SECRET", &config.spotify.client_secret);
    let redirect_uri = pick("SPOTIFY_REDIRECT_URI", &config.spotify.redirect_uri)
        .unwrap_or_else(|| default_redirect_uri.to_string());

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(SpotifyCredentials {
            client_id,
            client_secret,
            redirect_uri,
        }),
        _ => Err(Error::Config(
            "Spotify credentials not found. Configure using one of:\n\
             1. Environment: SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET\n\
             2. TOML config: [spotify] client_id / client_secret"
                .to_string(),
        )),
    }
}
