use std::collections::HashMap;

use crate::captions::TokenizedCaptions;
use crate::metrics::precook;
use crate::scorer::{paired, ScoreOutput, Scorer, ScorerError};

const TINY: f64 = 1e-15;
const SMALL: f64 = 1e-9;

/// Corpus BLEU for n-gram orders `1..=n`, using the reference length closest to each
/// prediction for the brevity penalty.
#[derive(Debug, Clone, Copy)]
pub struct Bleu {
    n: usize,
}

impl Bleu {
    pub fn new(n: usize) -> Bleu {
        Bleu { n }
    }

    /// `Bleu_1` up to `Bleu_n`.
    pub fn labels(&self) -> Vec<String> {
        (1..=self.n).map(|k| format!("Bleu_{}", k)).collect()
    }
}

impl Default for Bleu {
    fn default() -> Bleu {
        Bleu::new(4)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BleuStats {
    testlen: usize,
    reflen: usize,
    guess: Vec<usize>,
    correct: Vec<usize>,
}

impl BleuStats {
    fn empty(n: usize) -> BleuStats {
        BleuStats {
            testlen: 0,
            reflen: 0,
            guess: vec![0; n],
            correct: vec![0; n],
        }
    }

    fn cook(hypo: &str, refs: &[String], n: usize) -> BleuStats {
        let mut max_counts: Vec<HashMap<String, usize>> = vec![HashMap::new(); n];
        for reference in refs {
            for (order, counts) in precook(reference, n).into_iter().enumerate() {
                for (ngram, count) in counts {
                    let max = max_counts[order].entry(ngram).or_insert(0);
                    *max = (*max).max(count);
                }
            }
        }

        let testlen = hypo.split_whitespace().count();
        let reflen = refs
            .iter()
            .map(|reference| reference.split_whitespace().count())
            .min_by_key(|&len| (len.abs_diff(testlen), len))
            .unwrap_or(0);

        let counts = precook(hypo, n);
        let correct = counts
            .iter()
            .zip(&max_counts)
            .map(|(hypo_counts, ref_counts)| {
                hypo_counts
                    .iter()
                    .map(|(ngram, &count)| {
                        count.min(ref_counts.get(ngram).copied().unwrap_or(0))
                    })
                    .sum::<usize>()
            })
            .collect();

        BleuStats {
            testlen,
            reflen,
            guess: (0..n).map(|k| testlen.saturating_sub(k)).collect(),
            correct,
        }
    }

    fn add(&mut self, other: &BleuStats) {
        self.testlen += other.testlen;
        self.reflen += other.reflen;
        for (total, guess) in self.guess.iter_mut().zip(&other.guess) {
            *total += guess;
        }
        for (total, correct) in self.correct.iter_mut().zip(&other.correct) {
            *total += correct;
        }
    }

    fn scores(&self) -> Vec<f64> {
        let ratio = (self.testlen as f64 + TINY) / (self.reflen as f64 + SMALL);
        let mut bleu = 1.0f64;
        self.correct
            .iter()
            .zip(&self.guess)
            .enumerate()
            .map(|(k, (&correct, &guess))| {
                bleu *= (correct as f64 + TINY) / (guess as f64 + SMALL);
                let mut score = bleu.powf(1.0 / (k + 1) as f64);
                if ratio < 1.0 {
                    score *= (1.0 - 1.0 / ratio).exp();
                }
                score
            })
            .collect()
    }
}

impl Scorer for Bleu {
    fn method(&self) -> &str {
        "Bleu"
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        let mut total = BleuStats::empty(self.n);
        let mut per_item = vec![Vec::new(); self.n];
        for (_, hypo, refs) in paired(gts, res)? {
            let stats = BleuStats::cook(hypo, refs, self.n);
            for (order, score) in stats.scores().into_iter().enumerate() {
                per_item[order].push(score);
            }
            total.add(&stats);
        }
        Ok(ScoreOutput {
            aggregate: total.scores(),
            per_item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(hypo: &str, reference: &str) -> (TokenizedCaptions, TokenizedCaptions) {
        let gts = TokenizedCaptions::from([(0, vec![reference.to_string()])]);
        let res = TokenizedCaptions::from([(0, vec![hypo.to_string()])]);
        (gts, res)
    }

    #[test]
    fn test_labels() {
        assert_eq!(Bleu::new(4).labels(), vec!["Bleu_1", "Bleu_2", "Bleu_3", "Bleu_4"]);
    }

    #[test]
    fn test_perfect_match() {
        let (gts, res) = single("the quick brown fox jumps", "the quick brown fox jumps");
        let output = Bleu::new(4).compute_score(&gts, &res).unwrap();
        assert_eq!(output.aggregate.len(), 4);
        for score in output.aggregate {
            assert!((score - 1.0).abs() < 1e-6, "expected 1.0, got {}", score);
        }
    }

    #[test]
    fn test_partial_match() {
        let (gts, res) = single("the cat sat on the mat", "the cat is on the mat");
        let output = Bleu::new(4).compute_score(&gts, &res).unwrap();
        let expected = [5.0 / 6.0, 0.5f64.sqrt(), 0.5];
        for (score, expected) in output.aggregate.iter().zip(expected) {
            assert!((score - expected).abs() < 1e-6, "expected {}, got {}", expected, score);
        }
        assert!(output.aggregate[3] < 1e-3);
    }

    #[test]
    fn test_brevity_penalty() {
        let (gts, res) = single("the cat", "the cat sat on the mat");
        let output = Bleu::new(1).compute_score(&gts, &res).unwrap();
        assert!((output.aggregate[0] - (-2.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_pools_counts() {
        let gts = TokenizedCaptions::from([
            (0, vec!["a b".to_string()]),
            (1, vec!["e f".to_string()]),
        ]);
        let res = TokenizedCaptions::from([
            (0, vec!["a b".to_string()]),
            (1, vec!["c d".to_string()]),
        ]);
        let output = Bleu::new(1).compute_score(&gts, &res).unwrap();
        assert!((output.aggregate[0] - 0.5).abs() < 1e-6);
        assert!((output.per_item[0][0] - 1.0).abs() < 1e-6);
        assert!(output.per_item[0][1] < 1e-6);
    }

    #[test]
    fn test_closest_reference_length() {
        let refs = vec!["a b c d e f g h".to_string(), "a b c".to_string()];
        let stats = BleuStats::cook("a b c", &refs, 2);
        assert_eq!(stats.reflen, 3);
        assert_eq!(stats.correct, vec![3, 2]);
        assert_eq!(stats.guess, vec![3, 2]);
    }

    #[test]
    fn test_empty_collection_scores_zero() {
        let empty = TokenizedCaptions::new();
        let output = Bleu::new(4).compute_score(&empty, &empty).unwrap();
        assert_eq!(output.aggregate, vec![0.0; 4]);
    }
}
