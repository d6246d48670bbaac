use std::fmt;

use thiserror::Error;

use crate::captions::TokenizedCaptions;
use crate::metrics::{Bleu, Cider, Rouge};

#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("reference and prediction ids differ")]
    MismatchedIds,

    #[error("item {key} has {count} predicted captions, expected exactly 1")]
    PredictionCount { key: usize, count: usize },

    #[error("item {key} has no reference captions")]
    NoReferences { key: usize },

    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Process {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable scorer output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("no score reported for item {0}")]
    MissingItem(usize),

    #[error("scorer process closed its output early")]
    ClosedOutput,

    #[error("unexpected scorer reply {0:?}")]
    Reply(String),
}

/// What a scorer hands back: one aggregate per sub-score, and for each sub-score the
/// per-item values in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutput {
    pub aggregate: Vec<f64>,
    pub per_item: Vec<Vec<f64>>,
}

impl ScoreOutput {
    pub fn single(aggregate: f64, per_item: Vec<f64>) -> ScoreOutput {
        ScoreOutput {
            aggregate: vec![aggregate],
            per_item: vec![per_item],
        }
    }
}

/// A caption similarity metric computed over a whole collection at once.
pub trait Scorer {
    fn method(&self) -> &str;

    /// `gts` holds one or more reference captions per key, `res` exactly one prediction.
    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn method(&self) -> &str {
        (**self).method()
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        (**self).compute_score(gts, res)
    }
}

/// Output key(s) for a scorer's aggregate(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Labels {
    Single(String),
    Multi(Vec<String>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Single(_) => 1,
            Labels::Multi(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let labels: &[String] = match self {
            Labels::Single(label) => std::slice::from_ref(label),
            Labels::Multi(labels) => labels,
        };
        labels.iter().map(String::as_str)
    }
}

impl From<&str> for Labels {
    fn from(label: &str) -> Labels {
        Labels::Single(label.to_string())
    }
}

impl From<Vec<String>> for Labels {
    fn from(labels: Vec<String>) -> Labels {
        Labels::Multi(labels)
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().collect::<Vec<_>>().join(", "))
    }
}

/// One registry entry: a scorer and the label(s) its aggregate(s) are reported under.
pub struct ScorerEntry {
    pub scorer: Box<dyn Scorer>,
    pub labels: Labels,
}

impl ScorerEntry {
    pub fn new(scorer: impl Scorer + 'static, labels: impl Into<Labels>) -> ScorerEntry {
        ScorerEntry {
            scorer: Box::new(scorer),
            labels: labels.into(),
        }
    }
}

impl fmt::Debug for ScorerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScorerEntry")
            .field("method", &self.scorer.method())
            .field("labels", &self.labels)
            .finish()
    }
}

/// The scorer being tested on when not running verbose: METEOR alone.
pub fn default_scorers(meteor: impl Scorer + 'static) -> Vec<ScorerEntry> {
    vec![ScorerEntry::new(meteor, "METEOR")]
}

pub fn all_scorers(
    meteor: impl Scorer + 'static,
    spice: impl Scorer + 'static,
) -> Vec<ScorerEntry> {
    let bleu = Bleu::new(4);
    let bleu_labels = bleu.labels();
    vec![
        ScorerEntry::new(bleu, bleu_labels),
        ScorerEntry::new(meteor, "METEOR"),
        ScorerEntry::new(Rouge::new(), "ROUGE_L"),
        ScorerEntry::new(Cider::new(), "CIDEr"),
        ScorerEntry::new(spice, "SPICE"),
    ]
}

/// Pairs every prediction with its references, in ascending key order.
pub(crate) fn paired<'a>(
    gts: &'a TokenizedCaptions,
    res: &'a TokenizedCaptions,
) -> Result<Vec<(usize, &'a str, &'a [String])>, ScorerError> {
    if !gts.keys().eq(res.keys()) {
        return Err(ScorerError::MismatchedIds);
    }
    res.iter()
        .zip(gts.values())
        .map(|((&key, hypo), refs)| {
            if hypo.len() != 1 {
                return Err(ScorerError::PredictionCount {
                    key,
                    count: hypo.len(),
                });
            }
            if refs.is_empty() {
                return Err(ScorerError::NoReferences { key });
            }
            Ok((key, hypo[0].as_str(), refs.as_slice()))
        })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ExactMeteor, Meteor, Spice};

    fn captions(entries: Vec<(usize, Vec<&str>)>) -> TokenizedCaptions {
        entries
            .into_iter()
            .map(|(key, caps)| (key, caps.into_iter().map(String::from).collect()))
            .collect()
    }

    #[test]
    fn test_paired_requires_matching_keys() {
        let gts = captions(vec![(0, vec!["a"]), (1, vec!["b"])]);
        let res = captions(vec![(0, vec!["a"])]);
        assert!(matches!(paired(&gts, &res), Err(ScorerError::MismatchedIds)));
    }

    #[test]
    fn test_paired_requires_one_prediction() {
        let gts = captions(vec![(0, vec!["a"])]);
        let res = captions(vec![(0, vec!["a", "b"])]);
        assert!(matches!(
            paired(&gts, &res),
            Err(ScorerError::PredictionCount { key: 0, count: 2 })
        ));
    }

    #[test]
    fn test_paired_requires_references() {
        let gts = captions(vec![(4, vec![])]);
        let res = captions(vec![(4, vec!["a"])]);
        assert!(matches!(
            paired(&gts, &res),
            Err(ScorerError::NoReferences { key: 4 })
        ));
    }

    #[test]
    fn test_presets() {
        let minimal = default_scorers(Meteor::default());
        assert_eq!(minimal.len(), 1);
        assert_eq!(minimal[0].labels, Labels::from("METEOR"));
        assert_eq!(minimal[0].scorer.method(), "METEOR");

        let labels: Vec<String> = all_scorers(Meteor::default(), Spice::default())
            .iter()
            .flat_map(|entry| entry.labels.iter().map(String::from).collect::<Vec<_>>())
            .collect();
        assert_eq!(
            labels,
            vec!["Bleu_1", "Bleu_2", "Bleu_3", "Bleu_4", "METEOR", "ROUGE_L", "CIDEr", "SPICE"]
        );
    }

    #[test]
    fn test_boxed_scorer_delegates() {
        let fallback: Box<dyn Scorer> = Box::new(ExactMeteor::new());
        let entries = default_scorers(fallback);
        let gts = captions(vec![(0, vec!["a man speaks"])]);
        let output = entries[0].scorer.compute_score(&gts, &gts).unwrap();
        assert_eq!(entries[0].scorer.method(), "METEOR");
        assert_eq!(output.aggregate.len(), 1);
        assert!(output.aggregate[0] > 0.0);
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0]), 1.5);
    }
}
