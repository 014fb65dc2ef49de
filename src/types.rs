use std::{fmt::Display, str::FromStr};

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format every persisted timestamp uses.
pub(crate) static TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw answer of the sentiment service.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sentiment {
    pub label: String,
    /// Confidence in `0.0..=1.0`
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Mood {
    Positive,
    Negative,
    Neutral,
}

impl Mood {
    #[cfg(test)]
    pub(crate) const ALL: [Mood; 3] = [Mood::Positive, Mood::Negative, Mood::Neutral];

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Mood::Positive => "Positive",
            Mood::Negative => "Negative",
            Mood::Neutral => "Neutral",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Energy {
    Low,
    Medium,
    High,
}

impl Energy {
    pub(crate) const ALL: [Energy; 3] = [Energy::Low, Energy::Medium, Energy::High];

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Energy::Low => "Low",
            Energy::Medium => "Medium",
            Energy::High => "High",
        }
    }
}

impl FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Energy::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown energy level: {:?}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Social {
    Social,
    Solo,
    Either,
}

impl Social {
    pub(crate) const ALL: [Social; 3] = [Social::Social, Social::Solo, Social::Either];

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Social::Social => "Social",
            Social::Solo => "Solo",
            Social::Either => "Either",
        }
    }
}

impl FromStr for Social {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Social::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown social preference: {:?}", s))
    }
}

/// One completed analysis as it is stored in the mood log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MoodRecord {
    #[serde(rename = "entry")]
    pub text: String,
    pub mood: Mood,
    pub polarity: f64,
    pub timestamp: String,
}

impl MoodRecord {
    pub(crate) fn now(text: String, mood: Mood, polarity: f64) -> Self {
        Self {
            text,
            mood,
            polarity,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
