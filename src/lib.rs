//! Language metrics for generated video captions scored against single reference
//! captions: METEOR by default, plus BLEU, ROUGE-L, CIDEr and SPICE.

pub mod captions;
pub mod error;
pub mod evaluate;
pub mod ground_truth;
pub mod metrics;
pub mod normalize;
pub mod prediction;
pub mod progress;
pub mod report;
pub mod scorer;
pub mod tokenizer;

pub use captions::{CaptionRecord, MetricScores, RawCaptions, TokenizedCaptions};
pub use error::{Error, Result};
pub use evaluate::{Alignment, Evaluator};
pub use ground_truth::GroundTruth;
pub use prediction::Prediction;
pub use scorer::{
    all_scorers, default_scorers, Labels, ScoreOutput, Scorer, ScorerEntry, ScorerError,
};
pub use tokenizer::{PtbTokenizer, Tokenizer};
