//! Conversation analysis and music recommendation services

pub mod chat_analyzer;
pub mod emotion_mapper;
pub mod music_preferences;
pub mod recommender;
pub mod sms_parser;
pub mod spotify;

pub use chat_analyzer::{AnalysisError, ChatAnalyzer};
pub use music_preferences::MusicPreferences;
pub use recommender::MusicRecommender;
pub use sms_parser::{ParseError, SmsParser};
