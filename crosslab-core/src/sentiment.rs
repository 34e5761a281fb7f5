//! Keyword sentiment tagging for news headlines.
//!
//! A headline is Positive if it mentions any gain keyword, otherwise Negative
//! if it mentions any loss keyword, otherwise Neutral. Matching is a
//! case-insensitive substring check, so "upgrade" counts as "up". This is a
//! deliberately crude tag independent of the numeric pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

const POSITIVE_KEYWORDS: &[&str] = &["gain", "up", "rise", "soar"];
const NEGATIVE_KEYWORDS: &[&str] = &["fall", "down", "drop", "loss"];

/// Headlines shown per feed.
pub const MAX_HEADLINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedHeadline {
    pub title: String,
    pub sentiment: Sentiment,
}

pub fn classify(headline: &str) -> Sentiment {
    let lower = headline.to_lowercase();
    if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Sentiment::Positive
    } else if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Tag the first [`MAX_HEADLINES`] headlines.
pub fn tag_headlines<S: AsRef<str>>(headlines: &[S]) -> Vec<TaggedHeadline> {
    headlines
        .iter()
        .take(MAX_HEADLINES)
        .map(|h| TaggedHeadline {
            title: h.as_ref().to_string(),
            sentiment: classify(h.as_ref()),
        })
        .collect()
}
