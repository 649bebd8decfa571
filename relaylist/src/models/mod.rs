//! Data types shared by the parser, analyzer, recommender and API

pub mod analysis;
pub mod audio;
pub mod message;
pub mod track;

pub use analysis::*;
pub use audio::{AudioFeature, Emotion};
pub use message::*;
pub use track::RecommendedTrack;
