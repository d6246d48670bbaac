use std::ops::AddAssign;

use crate::captions::TokenizedCaptions;
use crate::scorer::{paired, ScoreOutput, Scorer, ScorerError};

/// Exact-match METEOR with the Meteor 1.5 English parameters, computed without the Java
/// release. Stemming, synonym and paraphrase matching are not available here, so scores
/// run lower than [`crate::metrics::Meteor`] on captions that only match through them.
///
/// The aggregate is computed from match statistics pooled over the whole collection,
/// not as a mean of per-item scores.
#[derive(Debug, Clone, Copy)]
pub struct ExactMeteor {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl ExactMeteor {
    pub fn new() -> ExactMeteor {
        ExactMeteor {
            alpha: 0.85,
            beta: 0.20,
            gamma: 0.60,
        }
    }

    pub fn with_parameters(alpha: f64, beta: f64, gamma: f64) -> ExactMeteor {
        ExactMeteor { alpha, beta, gamma }
    }

    fn score(&self, stats: &MatchStats) -> f64 {
        if stats.matches == 0 {
            return 0.0;
        }
        let matches = stats.matches as f64;
        let precision = matches / stats.hyp_len as f64;
        let recall = matches / stats.ref_len as f64;
        let fmean =
            precision * recall / (self.alpha * precision + (1.0 - self.alpha) * recall);
        let fragmentation = stats.chunks as f64 / matches;
        let penalty = self.gamma * fragmentation.powf(self.beta);
        fmean * (1.0 - penalty)
    }
}

impl Default for ExactMeteor {
    fn default() -> ExactMeteor {
        ExactMeteor::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MatchStats {
    hyp_len: usize,
    ref_len: usize,
    matches: usize,
    chunks: usize,
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: MatchStats) {
        self.hyp_len += other.hyp_len;
        self.ref_len += other.ref_len;
        self.matches += other.matches;
        self.chunks += other.chunks;
    }
}

/// Aligns identical words one-to-one, continuing the previous chunk when the next
/// reference word allows it and otherwise taking the leftmost free occurrence.
fn align(hypo: &str, reference: &str) -> MatchStats {
    let hyp: Vec<&str> = hypo.split_whitespace().collect();
    let refw: Vec<&str> = reference.split_whitespace().collect();

    let mut used = vec![false; refw.len()];
    let mut previous: Option<(usize, usize)> = None;
    let mut matches = 0;
    let mut chunks = 0;
    for (i, word) in hyp.iter().enumerate() {
        let continuation = previous
            .filter(|&(pi, _)| pi + 1 == i)
            .map(|(_, pj)| pj + 1)
            .filter(|&j| j < refw.len() && !used[j] && refw[j] == *word);
        let target =
            continuation.or_else(|| (0..refw.len()).find(|&j| !used[j] && refw[j] == *word));
        if let Some(j) = target {
            used[j] = true;
            matches += 1;
            if continuation.is_none() {
                chunks += 1;
            }
            previous = Some((i, j));
        }
    }

    MatchStats {
        hyp_len: hyp.len(),
        ref_len: refw.len(),
        matches,
        chunks,
    }
}

impl Scorer for ExactMeteor {
    fn method(&self) -> &str {
        "METEOR"
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        let mut total = MatchStats::default();
        let mut per_item = Vec::new();
        for (_, hypo, refs) in paired(gts, res)? {
            let (stats, score) = refs
                .iter()
                .map(|reference| {
                    let stats = align(hypo, reference);
                    (stats, self.score(&stats))
                })
                .fold((MatchStats::default(), f64::NEG_INFINITY), |best, candidate| {
                    if candidate.1 > best.1 {
                        candidate
                    } else {
                        best
                    }
                });
            total += stats;
            per_item.push(score);
        }
        Ok(ScoreOutput::single(self.score(&total), per_item))
    }
}
