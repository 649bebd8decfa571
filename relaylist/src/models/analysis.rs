//! Chat analysis result types

use super::Emotion;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyword-based emotion distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// Keyword hits per emotion (a message may hit several)
    pub counts: BTreeMap<Emotion, usize>,
    /// Share of all hits, 0..100
    pub percentages: BTreeMap<Emotion, f64>,
    pub dominant: Emotion,
    /// Primary emotion of each message, in message order
    pub message_emotions: Vec<Emotion>,
    pub total_analyzed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentTrend {
    Improving,
    Declining,
    Stable,
}

impl SentimentTrend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.01 {
            SentimentTrend::Improving
        } else if slope < -0.01 {
            SentimentTrend::Declining
        } else {
            SentimentTrend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentTrend::Improving => "Improving",
            SentimentTrend::Declining => "Declining",
            SentimentTrend::Stable => "Stable",
        }
    }
}

/// Sentiment of one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub timestamp: NaiveDateTime,
    pub polarity: f64,
    pub subjectivity: f64,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// -1..1, three decimals
    pub average_polarity: f64,
    /// 0..1, three decimals
    pub average_subjectivity: f64,
    pub sentiment_label: SentimentLabel,
    pub trend: SentimentTrend,
    pub timeline: Vec<SentimentPoint>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub top_words: Vec<TermCount>,
    pub top_phrases: Vec<TermCount>,
    pub total_unique_words: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    /// Hour of day (0..23) → message count
    pub hourly_distribution: BTreeMap<u32, usize>,
    pub peak_hour: u32,
    /// Weekdays that have messages, Monday first
    pub daily_distribution: Vec<DayCount>,
    pub most_active_day: String,
}

/// Complete result of `ChatAnalyzer::analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnalysis {
    pub emotions: EmotionAnalysis,
    pub sentiment: SentimentAnalysis,
    pub topics: TopicAnalysis,
    pub temporal_patterns: TemporalPatterns,
    pub summary: String,
}
