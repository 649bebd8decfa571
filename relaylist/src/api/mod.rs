//! HTTP API handlers for Relaylist

pub mod genres;
pub mod health;
pub mod recommendations;
pub mod sessions;
pub mod spotify_auth;
pub mod ui;

pub use genres::genre_routes;
pub use health::health_routes;
pub use recommendations::recommendation_routes;
pub use sessions::session_routes;
pub use spotify_auth::spotify_auth_routes;
pub use ui::ui_routes;
