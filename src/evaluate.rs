use std::path::Path;

use indicatif::ProgressIterator;
use log::{debug, info, warn};

use crate::captions::{CaptionRecord, MetricScores, RawCaptions};
use crate::error::{Error, Result};
use crate::ground_truth::GroundTruth;
use crate::normalize::{normalize_prediction, normalize_reference};
use crate::prediction::{read_predictions, Prediction};
use crate::progress::scorer_progress_bar;
use crate::scorer::{Labels, ScorerEntry};
use crate::tokenizer::Tokenizer;

/// Predictions matched to their references, keyed `0..n` in submission order.
///
/// Predictions whose `video_id` names no ground-truth row are not scored; their ids are
/// kept in `dropped` so callers can report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub res: RawCaptions,
    pub gts: RawCaptions,
    pub dropped: Vec<String>,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.res.len()
    }

    pub fn is_empty(&self) -> bool {
        self.res.is_empty()
    }
}

pub struct Evaluator {
    ground_truth: GroundTruth,
    predictions: Vec<Prediction>,
    tokenizer: Box<dyn Tokenizer>,
    scorers: Vec<ScorerEntry>,
    verbose: bool,
}

impl Evaluator {
    pub fn new(
        ground_truth: GroundTruth,
        predictions: Vec<Prediction>,
        tokenizer: impl Tokenizer + 'static,
        scorers: Vec<ScorerEntry>,
    ) -> Evaluator {
        Evaluator {
            ground_truth,
            predictions,
            tokenizer: Box::new(tokenizer),
            scorers,
            verbose: false,
        }
    }

    /// Checks that both inputs were given before reading either, then loads ground truth
    /// and predictions in that order.
    pub fn from_files(
        reference: Option<&Path>,
        submission: Option<&Path>,
        tokenizer: impl Tokenizer + 'static,
        scorers: Vec<ScorerEntry>,
    ) -> Result<Evaluator> {
        let reference = reference.ok_or(Error::MissingInput("ground truth"))?;
        let submission = submission.ok_or(Error::MissingInput("prediction"))?;
        let ground_truth = GroundTruth::load(reference)?;
        let predictions = read_predictions(submission)?;
        Ok(Evaluator::new(ground_truth, predictions, tokenizer, scorers))
    }

    /// Shows a progress bar over the scorers.
    pub fn verbose(mut self, verbose: bool) -> Evaluator {
        self.verbose = verbose;
        self
    }

    pub fn ground_truth(&self) -> &GroundTruth {
        &self.ground_truth
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn scorers(&self) -> &[ScorerEntry] {
        &self.scorers
    }

    pub fn align(&self) -> Alignment {
        let mut alignment = Alignment::default();
        for prediction in &self.predictions {
            let reference = prediction
                .ground_truth_id()
                .and_then(|id| self.ground_truth.caption(id));
            match reference {
                Some(reference) => {
                    let key = alignment.res.len();
                    alignment.res.insert(
                        key,
                        vec![CaptionRecord::new(normalize_prediction(&prediction.caption))],
                    );
                    alignment
                        .gts
                        .insert(key, vec![CaptionRecord::new(normalize_reference(reference))]);
                }
                None => alignment.dropped.push(prediction.video_id.clone()),
            }
        }
        alignment
    }

    /// Scores every aligned prediction with every scorer, in registry order. The first
    /// failure aborts the run and nothing computed so far is returned.
    pub fn evaluate(&self) -> Result<MetricScores> {
        let alignment = self.align();
        info!("aligned {} predictions", alignment.len());
        if !alignment.dropped.is_empty() {
            warn!(
                "{} predictions have no ground truth and were not scored",
                alignment.dropped.len()
            );
            debug!("unscored video ids\t{:?}", alignment.dropped);
        }

        let res = self.tokenizer.tokenize(&alignment.res)?;
        let gts = self.tokenizer.tokenize(&alignment.gts)?;

        let mut output = MetricScores::new();
        let progress = scorer_progress_bar(self.scorers.len(), self.verbose);
        for entry in self.scorers.iter().progress_with(progress.clone()) {
            let method = entry.scorer.method();
            progress.set_message(method.to_string());
            info!("computing {} score...", method);
            let scores = entry
                .scorer
                .compute_score(&gts, &res)
                .map_err(|source| Error::Scorer {
                    method: method.to_string(),
                    source,
                })?;
            merge_scores(&mut output, method, &entry.labels, scores.aggregate)?;
        }
        progress.finish_and_clear();
        Ok(output)
    }
}

fn merge_scores(
    output: &mut MetricScores,
    method: &str,
    labels: &Labels,
    aggregate: Vec<f64>,
) -> Result<()> {
    if labels.len() != aggregate.len() {
        return Err(Error::LabelMismatch {
            method: method.to_string(),
            labels: labels.len(),
            scores: aggregate.len(),
        });
    }
    for (label, score) in labels.iter().zip(aggregate) {
        output.insert(label.to_string(), score);
    }
    Ok(())
}
