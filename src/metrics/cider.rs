use std::collections::HashMap;

use crate::captions::TokenizedCaptions;
use crate::metrics::precook;
use crate::scorer::{mean, paired, ScoreOutput, Scorer, ScorerError};

type NgramVector = Vec<HashMap<String, f64>>;

/// Consensus-based image description evaluation: TF-IDF weighted n-gram cosine
/// similarity, with document frequencies taken from the references of the collection
/// being scored.
#[derive(Debug, Clone, Copy)]
pub struct Cider {
    n: usize,
}

impl Cider {
    pub fn new() -> Cider {
        Cider { n: 4 }
    }

    fn counts_to_vector(
        &self,
        counts: &[HashMap<String, usize>],
        document_frequency: &HashMap<String, usize>,
        ref_len: f64,
    ) -> (NgramVector, Vec<f64>) {
        let vector: NgramVector = counts
            .iter()
            .map(|order| {
                order
                    .iter()
                    .map(|(ngram, &term_freq)| {
                        let df = (document_frequency.get(ngram).copied().unwrap_or(0) as f64)
                            .max(1.0)
                            .ln();
                        (ngram.clone(), term_freq as f64 * (ref_len - df))
                    })
                    .collect()
            })
            .collect();
        let norms = vector
            .iter()
            .map(|order| order.values().map(|v| v * v).sum::<f64>().sqrt())
            .collect();
        (vector, norms)
    }

    fn similarity(
        &self,
        (vec_hyp, norm_hyp): &(NgramVector, Vec<f64>),
        (vec_ref, norm_ref): &(NgramVector, Vec<f64>),
    ) -> Vec<f64> {
        (0..self.n)
            .map(|order| {
                let dot: f64 = vec_hyp[order]
                    .iter()
                    .map(|(ngram, weight)| {
                        weight * vec_ref[order].get(ngram).copied().unwrap_or(0.0)
                    })
                    .sum();
                if norm_hyp[order] != 0.0 && norm_ref[order] != 0.0 {
                    dot / (norm_hyp[order] * norm_ref[order])
                } else {
                    dot
                }
            })
            .collect()
    }
}

impl Default for Cider {
    fn default() -> Cider {
        Cider::new()
    }
}

impl Scorer for Cider {
    fn method(&self) -> &str {
        "CIDEr"
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        let items: Vec<(Vec<HashMap<String, usize>>, Vec<Vec<HashMap<String, usize>>>)> =
            paired(gts, res)?
                .into_iter()
                .map(|(_, hypo, refs)| {
                    let refs = refs.iter().map(|r| precook(r, self.n)).collect();
                    (precook(hypo, self.n), refs)
                })
                .collect();

        // an n-gram counts once per item, however many of its references contain it
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for (_, refs) in &items {
            let mut seen: Vec<&String> =
                refs.iter().flatten().flat_map(|order| order.keys()).collect();
            seen.sort();
            seen.dedup();
            for ngram in seen {
                *document_frequency.entry(ngram.clone()).or_insert(0) += 1;
            }
        }

        let ref_len = (items.len() as f64).ln();
        let per_item: Vec<f64> = items
            .iter()
            .map(|(hypo, refs)| {
                let hyp_vector = self.counts_to_vector(hypo, &document_frequency, ref_len);
                let mut total = vec![0.0; self.n];
                for reference in refs {
                    let ref_vector =
                        self.counts_to_vector(reference, &document_frequency, ref_len);
                    for (sum, value) in total
                        .iter_mut()
                        .zip(self.similarity(&hyp_vector, &ref_vector))
                    {
                        *sum += value;
                    }
                }
                mean(&total) / refs.len() as f64 * 10.0
            })
            .collect();

        Ok(ScoreOutput::single(mean(&per_item), per_item))
    }
}
