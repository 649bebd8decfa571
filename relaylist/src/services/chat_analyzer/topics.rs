//! Word and phrase frequency topics

use super::rank_by_count;
use super::stopwords::is_stopword;
use crate::models::{Message, TermCount, TopicAnalysis};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_TOP_WORDS: usize = 10;

/// Bigrams reported alongside the top words
const TOP_PHRASES: usize = 5;

/// Minimum length (in chars) for a word to count as a topic
const MIN_WORD_CHARS: usize = 4;

/// Topic-bearing words of one text: alphabetic, longer than three
/// characters, not a stop word
fn topic_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .unicode_words()
        .filter(|w| w.chars().all(char::is_alphabetic))
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .filter(|w| !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Most frequent words and adjacent word pairs across the conversation
///
/// Pairs are formed from the filtered word stream of the whole
/// conversation, so a pair may straddle two messages.
pub fn identify_topics(messages: &[Message], top_n: usize) -> TopicAnalysis {
    let words: Vec<String> = messages
        .iter()
        .flat_map(|m| topic_words(&m.content))
        .collect();

    let total_words = words.len();
    let total_unique_words = words.iter().collect::<HashSet<_>>().len();

    let top_words = rank_by_count(words.iter().cloned())
        .into_iter()
        .take(top_n)
        .map(|(term, count)| TermCount { term, count })
        .collect();

    let top_phrases = rank_by_count(words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])))
        .into_iter()
        .take(TOP_PHRASES)
        .map(|(term, count)| TermCount { term, count })
        .collect();

    TopicAnalysis {
        top_words,
        top_phrases,
        total_unique_words,
        total_words,
    }
}
