//! Keyword-based emotion extraction

use super::rank_by_count;
use crate::models::{Emotion, EmotionAnalysis, Message};
use std::collections::BTreeMap;

const JOY: &[&str] = &[
    "happy", "excited", "great", "awesome", "love", "lol", "haha", "wonderful", "amazing",
    "fantastic", "glad", "yay", "😂", "😊", "❤️",
];
const SADNESS: &[&str] = &[
    "sad", "sorry", "miss", "cry", "depressed", "down", "unhappy", "disappointed", "hurt", "😢",
    "😭",
];
const ANGER: &[&str] = &[
    "angry", "mad", "hate", "annoyed", "frustrated", "furious", "irritated", "pissed", "😠", "😡",
];
const FEAR: &[&str] = &[
    "worried", "scared", "afraid", "anxious", "nervous", "fear", "concern", "stress", "panic",
];
const SURPRISE: &[&str] = &[
    "wow", "omg", "really", "shocked", "surprised", "unbelievable", "amazing", "😱", "😲",
];
const NEUTRAL: &[&str] = &["okay", "ok", "fine", "alright", "sure", "maybe"];

/// Keywords that signal `emotion`
pub fn emotion_keywords(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => JOY,
        Emotion::Sadness => SADNESS,
        Emotion::Anger => ANGER,
        Emotion::Fear => FEAR,
        Emotion::Surprise => SURPRISE,
        Emotion::Neutral => NEUTRAL,
    }
}

/// Emotions hit by one message: one entry per matching keyword
///
/// Matching is case-insensitive substring matching, so "ok" also hits
/// inside "okay". A message without any hit counts as neutral.
fn message_hits(content: &str) -> Vec<Emotion> {
    let text = content.to_lowercase();
    let mut hits = Vec::new();

    for emotion in Emotion::ALL {
        for keyword in emotion_keywords(emotion) {
            if text.contains(keyword) {
                hits.push(emotion);
            }
        }
    }

    if hits.is_empty() {
        hits.push(Emotion::Neutral);
    }
    hits
}

/// Extract the emotion distribution of a conversation
pub fn extract_emotions(messages: &[Message]) -> EmotionAnalysis {
    let mut message_emotions = Vec::with_capacity(messages.len());
    let mut all_hits = Vec::new();

    for message in messages {
        let hits = message_hits(&message.content);
        message_emotions.push(hits[0]);
        all_hits.extend(hits);
    }

    let ranked = rank_by_count(all_hits);
    let total: usize = ranked.iter().map(|(_, c)| c).sum();
    let dominant = ranked.first().map(|(e, _)| *e).unwrap_or(Emotion::Neutral);

    let counts: BTreeMap<Emotion, usize> = ranked.iter().cloned().collect();
    let percentages: BTreeMap<Emotion, f64> = ranked
        .iter()
        .map(|(emotion, count)| (*emotion, *count as f64 / total as f64 * 100.0))
        .collect();

    EmotionAnalysis {
        counts,
        percentages,
        dominant,
        message_emotions,
        total_analyzed: messages.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::msg;
    use super::*;

    #[test]
    fn test_every_keyword_counts() {
        // "sad" and "sorry" both hit sadness; "wow" hits surprise
        let analysis = extract_emotions(&[msg("2024-01-01 10:00", "Wow, sad and sorry")]);

        assert_eq!(analysis.counts.get(&Emotion::Sadness), Some(&2));
        assert_eq!(analysis.counts.get(&Emotion::Surprise), Some(&1));
        assert_eq!(analysis.dominant, Emotion::Sadness);
        // Primary emotion follows the fixed order, not the count
        assert_eq!(analysis.message_emotions, vec![Emotion::Sadness]);
    }

    #[test]
    fn test_percentages_are_not_rounded() {
        let analysis = extract_emotions(&[msg("2024-01-01 10:00", "Wow, sad and sorry")]);

        assert_eq!(analysis.percentages[&Emotion::Sadness], 2.0 / 3.0 * 100.0);
        assert_eq!(analysis.percentages[&Emotion::Surprise], 1.0 / 3.0 * 100.0);
    }

    #[test]
    fn test_no_keywords_is_neutral() {
        let analysis = extract_emotions(&[msg("2024-01-01 10:00", "see you at noon")]);

        assert_eq!(analysis.counts.get(&Emotion::Neutral), Some(&1));
        assert_eq!(analysis.dominant, Emotion::Neutral);
        assert_eq!(analysis.percentages.get(&Emotion::Neutral), Some(&100.0));
    }

    #[test]
    fn test_amazing_counts_for_joy_and_surprise() {
        let analysis = extract_emotions(&[msg("2024-01-01 10:00", "AMAZING")]);

        assert_eq!(analysis.counts.get(&Emotion::Joy), Some(&1));
        assert_eq!(analysis.counts.get(&Emotion::Surprise), Some(&1));
        // Tie resolves to the emotion counted first
        assert_eq!(analysis.dominant, Emotion::Joy);
    }

    #[test]
    fn test_emoji_keywords() {
        let analysis = extract_emotions(&[msg("2024-01-01 10:00", "😭😭")]);
        assert_eq!(analysis.dominant, Emotion::Sadness);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let analysis = extract_emotions(&[
            msg("2024-01-01 10:00", "so happy"),
            msg("2024-01-01 10:01", "I'm worried"),
            msg("2024-01-01 10:02", "lunch?"),
        ]);

        let sum: f64 = analysis.percentages.values().sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {}", sum);
        assert_eq!(analysis.total_analyzed, 3);
    }
}
