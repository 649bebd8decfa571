//! Lexicon-based sentiment scoring

use super::lexicon;
use super::round_to;
use crate::models::{Message, SentimentAnalysis, SentimentLabel, SentimentPoint, SentimentTrend};
use unicode_segmentation::UnicodeSegmentation;

/// Words a negation may skip before it stops applying
const NEGATION_REACH: usize = 2;

/// Polarity inversion applied to negated words
const NEGATION_FACTOR: f64 = -0.5;

/// Polarity (-1..1) and subjectivity (0..1) of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Score a single text against the lexicon
///
/// Each sentiment word yields one assessment, scaled by a preceding
/// intensifier and inverted (at half strength) by a preceding negation.
/// Text without sentiment words scores 0/0.
pub fn score_text(text: &str) -> TextSentiment {
    let lowered = text.to_lowercase();
    let mut assessments: Vec<(f64, f64)> = Vec::new();

    let mut negation_left = 0usize;
    let mut factor: Option<f64> = None;

    for token in lowered.unicode_words() {
        let word = token.replace('\u{2019}', "'");

        if lexicon::is_negation(&word) {
            negation_left = NEGATION_REACH + 1;
            continue;
        }

        if let Some(f) = lexicon::intensity(&word) {
            factor = Some(factor.unwrap_or(1.0) * f);
            continue;
        }

        match lexicon::lookup(&word) {
            Some((polarity, subjectivity)) => {
                let f = factor.take().unwrap_or(1.0);
                let mut polarity = (polarity * f).clamp(-1.0, 1.0);
                let subjectivity = (subjectivity * f).clamp(0.0, 1.0);
                if negation_left > 0 {
                    polarity *= NEGATION_FACTOR;
                    negation_left = 0;
                }
                assessments.push((polarity, subjectivity));
            }
            None => {
                factor = None;
                negation_left = negation_left.saturating_sub(1);
            }
        }
    }

    for (emoticon, polarity, subjectivity) in lexicon::EMOTICONS {
        for _ in text.matches(emoticon) {
            assessments.push((*polarity, *subjectivity));
        }
    }

    if assessments.is_empty() {
        return TextSentiment::default();
    }

    let n = assessments.len() as f64;
    TextSentiment {
        polarity: (assessments.iter().map(|(p, _)| p).sum::<f64>() / n).clamp(-1.0, 1.0),
        subjectivity: (assessments.iter().map(|(_, s)| s).sum::<f64>() / n).clamp(0.0, 1.0),
    }
}

/// Least-squares slope of `values` against their index
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Sentiment over a whole conversation
pub fn analyze_sentiment(messages: &[Message]) -> SentimentAnalysis {
    let timeline: Vec<SentimentPoint> = messages
        .iter()
        .map(|m| {
            let score = score_text(&m.content);
            SentimentPoint {
                timestamp: m.timestamp,
                polarity: score.polarity,
                subjectivity: score.subjectivity,
                sender: m.sender.clone(),
            }
        })
        .collect();

    let count = timeline.len();
    let (avg_polarity, avg_subjectivity) = if count == 0 {
        (0.0, 0.0)
    } else {
        (
            timeline.iter().map(|p| p.polarity).sum::<f64>() / count as f64,
            timeline.iter().map(|p| p.subjectivity).sum::<f64>() / count as f64,
        )
    };

    let polarities: Vec<f64> = timeline.iter().map(|p| p.polarity).collect();
    let trend = SentimentTrend::from_slope(linear_slope(&polarities));

    SentimentAnalysis {
        average_polarity: round_to(avg_polarity, 3),
        average_subjectivity: round_to(avg_subjectivity, 3),
        sentiment_label: SentimentLabel::from_polarity(avg_polarity),
        trend,
        timeline,
        count,
    }
}
