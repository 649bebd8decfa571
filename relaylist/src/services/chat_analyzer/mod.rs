//! Chat analyzer
//!
//! Runs the four analyses over a parsed conversation:
//! - emotions: keyword matching per emotion
//! - sentiment: lexicon polarity/subjectivity with a trend over time
//! - topics: word and bigram frequencies without stop words
//! - temporal: hour-of-day and weekday activity
//!
//! and renders a human-readable summary from the results.

mod emotions;
mod lexicon;
mod sentiment;
mod stopwords;
mod temporal;
mod topics;

pub use emotions::{emotion_keywords, extract_emotions};
pub use sentiment::{analyze_sentiment, score_text, TextSentiment};
pub use temporal::analyze_temporal_patterns;
pub use topics::{identify_topics, DEFAULT_TOP_WORDS};

use crate::models::{ChatAnalysis, EmotionAnalysis, Message, SentimentAnalysis, TopicAnalysis};
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No messages to analyze")]
    NoMessages,
}

/// Analyzes conversations for emotions, sentiment, topics and timing
#[derive(Debug, Default, Clone)]
pub struct ChatAnalyzer;

impl ChatAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Perform the full analysis
    pub fn analyze(&self, messages: &[Message]) -> Result<ChatAnalysis, AnalysisError> {
        if messages.is_empty() {
            return Err(AnalysisError::NoMessages);
        }

        let emotions = extract_emotions(messages);
        let sentiment = analyze_sentiment(messages);
        let topics = identify_topics(messages, DEFAULT_TOP_WORDS);
        let temporal_patterns = analyze_temporal_patterns(messages);
        let summary = generate_summary(messages.len(), &emotions, &sentiment, &topics);

        info!(
            messages = messages.len(),
            dominant = %emotions.dominant,
            polarity = sentiment.average_polarity,
            "Conversation analyzed"
        );

        Ok(ChatAnalysis {
            emotions,
            sentiment,
            topics,
            temporal_patterns,
            summary,
        })
    }
}

/// Human-readable summary of an analysis
pub fn generate_summary(
    message_count: usize,
    emotions: &EmotionAnalysis,
    sentiment: &SentimentAnalysis,
    topics: &TopicAnalysis,
) -> String {
    let dominant_pct = emotions
        .percentages
        .get(&emotions.dominant)
        .copied()
        .unwrap_or(0.0);

    let top_topics: Vec<&str> = topics
        .top_words
        .iter()
        .take(5)
        .map(|t| t.term.as_str())
        .collect();
    let topic_text = if top_topics.is_empty() {
        "no recurring topics".to_string()
    } else {
        top_topics.join(", ")
    };

    format!(
        "**Conversation Overview:**\n\
         This conversation contains {} messages with a {} overall tone (sentiment score: {}).\n\
         \n\
         **Emotional Analysis:**\n\
         The conversation is predominantly {}, with {:.1}% of messages expressing this emotion.\n\
         \n\
         **Key Topics:**\n\
         The main topics discussed include: {}.\n\
         \n\
         **Sentiment Trend:**\n\
         The emotional tone appears to be {} throughout the conversation.",
        message_count,
        sentiment.sentiment_label.as_str().to_lowercase(),
        sentiment.average_polarity,
        emotions.dominant,
        dominant_pct,
        topic_text,
        sentiment.trend.as_str().to_lowercase(),
    )
}

/// Count items, ordered by count descending; ties keep first-seen order
pub(crate) fn rank_by_count<T, I>(items: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut positions: HashMap<T, usize> = HashMap::new();
    let mut ranked: Vec<(T, usize)> = Vec::new();

    for item in items {
        match positions.get(&item) {
            Some(&pos) => ranked[pos].1 += 1,
            None => {
                positions.insert(item.clone(), ranked.len());
                ranked.push((item, 1));
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}


#[cfg(test)]
mod tests {
    use super::test_support::msg;
    use super::*;
    use crate::models::{Emotion, SentimentLabel};

    #[test]
    fn test_rank_by_count_ties_keep_first_seen() {
        let ranked = rank_by_count(vec!["b", "a", "a", "b", "c"]);
        assert_eq!(ranked, vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_empty_conversation_rejected() {
        assert_eq!(ChatAnalyzer::new().analyze(&[]), Err(AnalysisError::NoMessages));
    }

    #[test]
    fn test_full_analysis() {
        let messages = vec![
            msg("2024-03-01 20:00", "haha that concert was awesome"),
            msg("2024-03-01 20:05", "I love that band, the concert was great"),
            msg("2024-03-02 21:00", "so happy we went to the concert"),
        ];

        let analysis = ChatAnalyzer::new().analyze(&messages).unwrap();

        assert_eq!(analysis.emotions.dominant, Emotion::Joy);
        assert_eq!(analysis.sentiment.sentiment_label, SentimentLabel::Positive);
        assert_eq!(analysis.topics.top_words[0].term, "concert");
        assert_eq!(analysis.temporal_patterns.peak_hour, 20);
        assert!(analysis.summary.contains("contains 3 messages with a positive overall tone"));
        assert!(analysis.summary.contains("predominantly joy"));
        assert!(analysis.summary.contains("concert"));
    }
}
