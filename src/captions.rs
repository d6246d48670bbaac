use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single-field caption object, the unit the tokenizer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRecord {
    pub caption: String,
}

impl CaptionRecord {
    pub fn new(caption: impl Into<String>) -> CaptionRecord {
        CaptionRecord {
            caption: caption.into(),
        }
    }
}

/// Untokenized captions keyed by alignment key.
pub type RawCaptions = BTreeMap<usize, Vec<CaptionRecord>>;

/// Space-joined token strings keyed by alignment key.
pub type TokenizedCaptions = BTreeMap<usize, Vec<String>>;

/// Aggregate score per metric label.
pub type MetricScores = BTreeMap<String, f64>;
