//! Sentiment lexicon
//!
//! Word → (polarity, subjectivity). Polarity is -1..1, subjectivity 0..1.

pub(super) const WORDS: &[(&str, f64, f64)] = &[
    // positive
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("awesome", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("wonderful", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("excellent", 1.0, 1.0),
    ("perfect", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("cool", 0.35, 0.65),
    ("fun", 0.3, 0.2),
    ("funny", 0.25, 0.75),
    ("happy", 0.8, 1.0),
    ("glad", 0.5, 1.0),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("lovely", 0.5, 0.75),
    ("like", 0.2, 0.4),
    ("beautiful", 0.85, 1.0),
    ("cute", 0.5, 1.0),
    ("sweet", 0.35, 0.65),
    ("excited", 0.4, 0.75),
    ("exciting", 0.3, 0.8),
    ("thanks", 0.2, 0.2),
    ("thank", 0.2, 0.2),
    ("welcome", 0.8, 0.9),
    ("proud", 0.8, 1.0),
    ("kind", 0.6, 0.9),
    ("fine", 0.4, 0.5),
    ("yay", 0.5, 0.6),
    ("lol", 0.8, 0.7),
    ("haha", 0.2, 0.3),
    ("enjoy", 0.4, 0.5),
    ("enjoyed", 0.4, 0.5),
    ("fabulous", 0.4, 0.9),
    ("brilliant", 0.9, 1.0),
    ("delicious", 1.0, 1.0),
    ("easy", 0.43, 0.83),
    ("safe", 0.5, 0.5),
    ("calm", 0.3, 0.75),
    ("relaxed", 0.3, 0.6),
    ("fresh", 0.3, 0.5),
    ("interesting", 0.5, 0.5),
    ("hilarious", 0.5, 1.0),
    ("congrats", 0.8, 0.9),
    ("congratulations", 0.8, 0.9),
    ("incredible", 0.9, 0.9),
    ("success", 0.3, 0.3),
    ("win", 0.8, 0.4),
    // negative
    ("bad", -0.7, 0.667),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("sad", -0.5, 1.0),
    ("unhappy", -0.6, 0.9),
    ("sorry", -0.5, 1.0),
    ("hate", -0.8, 0.9),
    ("hated", -0.9, 0.7),
    ("angry", -0.5, 1.0),
    ("mad", -0.625, 1.0),
    ("annoying", -0.8, 0.9),
    ("annoyed", -0.4, 0.8),
    ("frustrated", -0.7, 0.8),
    ("furious", -0.9, 1.0),
    ("upset", -0.5, 0.8),
    ("worried", -0.4, 0.9),
    ("scared", -0.5, 1.0),
    ("afraid", -0.6, 0.9),
    ("anxious", -0.25, 0.75),
    ("nervous", -0.3, 1.0),
    ("stressed", -0.5, 0.9),
    ("tired", -0.4, 0.7),
    ("boring", -1.0, 1.0),
    ("bored", -0.5, 1.0),
    ("lonely", -0.4, 0.9),
    ("hurt", -0.3, 0.5),
    ("sick", -0.71, 0.86),
    ("ugly", -0.7, 1.0),
    ("stupid", -0.8, 1.0),
    ("dumb", -0.375, 0.5),
    ("wrong", -0.5, 0.9),
    ("poor", -0.4, 0.6),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("depressed", -0.7, 1.0),
    ("miserable", -1.0, 1.0),
    ("painful", -0.7, 0.9),
    ("crazy", -0.6, 0.9),
    ("difficult", -0.5, 1.0),
    ("hard", -0.29, 0.54),
    ("late", -0.3, 0.6),
    ("broken", -0.4, 0.4),
    ("lost", -0.3, 0.4),
    ("fail", -0.5, 0.3),
    ("failed", -0.5, 0.3),
    ("ugh", -0.5, 0.8),
    // mostly subjective, weakly polar
    ("really", 0.2, 0.2),
    ("surprised", 0.1, 0.9),
    ("shocked", -0.7, 1.0),
    ("weird", -0.5, 1.0),
    ("strange", -0.05, 0.15),
    ("okay", 0.5, 0.5),
    ("ok", 0.5, 0.5),
    ("alright", 0.2, 0.5),
    ("sure", 0.5, 0.9),
];

/// Emoticons, matched on the raw text
pub(super) const EMOTICONS: &[(&str, f64, f64)] = &[
    (":)", 0.5, 1.0),
    (":-)", 0.5, 1.0),
    (":D", 1.0, 1.0),
    (";)", 0.5, 1.0),
    ("<3", 0.8, 1.0),
    (":(", -0.75, 1.0),
    (":-(", -0.75, 1.0),
    (":'(", -0.75, 1.0),
];

/// Modifiers that scale the next sentiment word
pub(super) const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("totally", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("absolutely", 1.4),
    ("too", 1.2),
    ("pretty", 1.1),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

pub(super) const NEGATIONS: &[&str] = &["not", "no", "never", "nothing", "nobody", "cannot"];

pub(super) fn lookup(word: &str) -> Option<(f64, f64)> {
    WORDS
        .iter()
        .find(|(w, _, _)| *w == word)
        .map(|(_, p, s)| (*p, *s))
}

pub(super) fn intensity(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, f)| *f)
}

pub(super) fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}
