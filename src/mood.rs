use crate::client::SentimentClassifier;
use crate::error::Result;
use crate::types::{Mood, Sentiment};

/// Answers below this confidence are treated as neutral whatever the label.
pub(crate) const CONFIDENCE_FLOOR: f64 = 0.7;

pub(crate) fn mood_of(sentiment: &Sentiment) -> (Mood, f64) {
    if sentiment.score < CONFIDENCE_FLOOR {
        return (Mood::Neutral, 0.0);
    }
    match sentiment.label.as_str() {
        "POSITIVE" => (Mood::Positive, sentiment.score),
        "NEGATIVE" => (Mood::Negative, -sentiment.score),
        _ => (Mood::Neutral, 0.0),
    }
}

/// Classifier errors are passed through untouched.
pub(crate) fn classify(classifier: &dyn SentimentClassifier, text: &str) -> Result<(Mood, f64)> {
    let sentiment = classifier.classify(text)?;
    Ok(mood_of(&sentiment))
}
