use crate::captions::TokenizedCaptions;
use crate::scorer::{mean, paired, ScoreOutput, Scorer, ScorerError};

/// ROUGE-L: longest-common-subsequence F-measure, weighted towards recall.
#[derive(Debug, Clone, Copy)]
pub struct Rouge {
    beta: f64,
}

impl Rouge {
    pub fn new() -> Rouge {
        Rouge { beta: 1.2 }
    }

    fn calc_score(&self, candidate: &str, refs: &[String]) -> f64 {
        let candidate: Vec<&str> = candidate.split_whitespace().collect();
        if candidate.is_empty() {
            return 0.0;
        }

        let mut prec_max: f64 = 0.0;
        let mut rec_max: f64 = 0.0;
        for reference in refs {
            let reference: Vec<&str> = reference.split_whitespace().collect();
            if reference.is_empty() {
                continue;
            }
            let lcs = lcs_len(&candidate, &reference) as f64;
            prec_max = prec_max.max(lcs / candidate.len() as f64);
            rec_max = rec_max.max(lcs / reference.len() as f64);
        }

        if prec_max == 0.0 || rec_max == 0.0 {
            return 0.0;
        }
        let beta2 = self.beta * self.beta;
        ((1.0 + beta2) * prec_max * rec_max) / (rec_max + beta2 * prec_max)
    }
}

impl Default for Rouge {
    fn default() -> Rouge {
        Rouge::new()
    }
}

fn lcs_len(a: &[&str], b: &[&str]) -> usize {
    // one row of the dynamic programming table at a time
    let mut previous = vec![0; b.len() + 1];
    let mut current = vec![0; b.len() + 1];
    for word in a {
        for (j, other) in b.iter().enumerate() {
            current[j + 1] = if word == other {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

impl Scorer for Rouge {
    fn method(&self) -> &str {
        "Rouge"
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        let per_item: Vec<f64> = paired(gts, res)?
            .into_iter()
            .map(|(_, hypo, refs)| self.calc_score(hypo, refs))
            .collect();
        Ok(ScoreOutput::single(mean(&per_item), per_item))
    }
}
