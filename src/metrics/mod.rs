//! Caption similarity metrics in the coco-caption style. Each one scores a whole
//! collection in a single call through [`crate::scorer::Scorer`].

use std::collections::HashMap;

mod bleu;
mod cider;
mod exact_meteor;
mod meteor;
mod rouge;
mod spice;

pub use bleu::Bleu;
pub use cider::Cider;
pub use exact_meteor::ExactMeteor;
pub use meteor::{Meteor, DEFAULT_METEOR_JAR};
pub use rouge::Rouge;
pub use spice::{Spice, DEFAULT_SPICE_JAR};

/// Counts of every n-gram of order `1..=n`, one map per order, keyed by the
/// space-joined words.
pub(crate) fn precook(sentence: &str, n: usize) -> Vec<HashMap<String, usize>> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    (1..=n)
        .map(|k| {
            let mut counts = HashMap::new();
            for window in words.windows(k) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
            counts
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precook_counts_each_order() {
        let counts = precook("the cat the cat", 3);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0]["the"], 2);
        assert_eq!(counts[0]["cat"], 2);
        assert_eq!(counts[1]["the cat"], 2);
        assert_eq!(counts[1]["cat the"], 1);
        assert_eq!(counts[2].len(), 2);
    }

    #[test]
    fn test_precook_short_sentence() {
        let counts = precook("hi", 4);
        assert_eq!(counts[0].len(), 1);
        assert!(counts[1..].iter().all(|order| order.is_empty()));
    }
}
