use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::captions::MetricScores;
use crate::error::{Error, Result};

pub fn format_score(metric: &str, score: f64) -> String {
    format!("| {}: {:2.4}", metric.bold(), score)
}

pub fn print_scores(scores: &MetricScores) {
    for (metric, &score) in scores {
        println!("{}", format_score(metric, score));
    }
}

pub fn scores_to_json(scores: &MetricScores) -> String {
    // string keys and f64 values cannot fail; non-finite scores become null
    serde_json::to_string(scores).unwrap_or_default()
}

pub fn write_scores(path: &Path, scores: &MetricScores) -> Result<()> {
    fs::write(path, scores_to_json(scores)).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
