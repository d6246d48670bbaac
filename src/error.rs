use std::path::PathBuf;

use thiserror::Error;

use crate::scorer::ScorerError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way an evaluation run can fail. The first error aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Please input a valid {0} file.")]
    MissingInput(&'static str),

    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse tab-separated file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: row {row} has {fields} fields, expected at least 6")]
    ShortRow {
        path: PathBuf,
        row: usize,
        fields: usize,
    },

    #[error("could not parse JSON file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: expected a flat array of prediction records, found {found}")]
    PredictionShape { path: PathBuf, found: &'static str },

    #[error("tokenizer failed: {0}")]
    Tokenizer(String),

    #[error("{method} scorer failed: {source}")]
    Scorer {
        method: String,
        #[source]
        source: ScorerError,
    },

    #[error("{method} scorer returned {scores} aggregate scores for {labels} labels")]
    LabelMismatch {
        method: String,
        labels: usize,
        scores: usize,
    },
}
