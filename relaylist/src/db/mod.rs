//! Database queries for sessions, recommendations and Spotify tokens

pub mod recommendations;
pub mod sessions;
pub mod tokens;

pub use recommendations::{get_recommendations, save_recommendations, StoredRecommendation};
pub use sessions::{get_messages, get_session, list_sessions, save_chat_session, SessionRecord};
pub use tokens::{clear_user_token, load_user_token, save_user_token};
