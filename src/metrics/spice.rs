use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::captions::TokenizedCaptions;
use crate::scorer::{mean, paired, ScoreOutput, Scorer, ScorerError};

pub const DEFAULT_SPICE_JAR: &str = "coco-caption/pycocoevalcap/spice/spice-1.0.jar";

/// Semantic propositional image caption evaluation, delegated to the SPICE jar.
///
/// Captions are handed over through a scratch JSON file and the per-item F-scores read
/// back from the jar's output file. Requires a Java runtime.
#[derive(Debug, Clone)]
pub struct Spice {
    java: String,
    jar: PathBuf,
    cache_dir: Option<PathBuf>,
    max_heap: String,
}

impl Spice {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>) -> Spice {
        Spice {
            java: java.into(),
            jar: jar.into(),
            cache_dir: None,
            max_heap: String::from("8G"),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Spice {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    fn command(&self, in_path: &Path, out_path: &Path) -> Command {
        let mut command = Command::new(&self.java);
        command
            .arg("-jar")
            .arg(format!("-Xmx{}", self.max_heap))
            .arg(&self.jar)
            .arg(in_path);
        if let Some(cache_dir) = &self.cache_dir {
            command.arg("-cache").arg(cache_dir);
        }
        command.arg("-out").arg(out_path).arg("-subset").arg("-silent");
        command
    }
}

impl Default for Spice {
    fn default() -> Spice {
        Spice::new("java", DEFAULT_SPICE_JAR)
    }
}

#[derive(Debug, Serialize)]
struct SpiceInput<'a> {
    image_id: usize,
    test: &'a str,
    refs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SpiceResult {
    image_id: usize,
    scores: SpiceScores,
}

#[derive(Debug, Deserialize)]
struct SpiceScores {
    #[serde(rename = "All")]
    all: SpiceStat,
}

#[derive(Debug, Deserialize)]
struct SpiceStat {
    f: Value,
}

/// Per-item `All.f` scores in the order of `keys`; anything non-numeric reads as NaN.
fn read_scores<R: Read>(
    stream: R,
    keys: impl IntoIterator<Item = usize>,
) -> Result<Vec<f64>, ScorerError> {
    let results: Vec<SpiceResult> = serde_json::from_reader(stream)?;
    let by_id: HashMap<usize, f64> = results
        .into_iter()
        .map(|result| {
            let f = result.scores.all.f.as_f64().unwrap_or(f64::NAN);
            (result.image_id, f)
        })
        .collect();
    keys.into_iter()
        .map(|key| by_id.get(&key).copied().ok_or(ScorerError::MissingItem(key)))
        .collect()
}

impl Scorer for Spice {
    fn method(&self) -> &str {
        "SPICE"
    }

    fn compute_score(
        &self,
        gts: &TokenizedCaptions,
        res: &TokenizedCaptions,
    ) -> Result<ScoreOutput, ScorerError> {
        let items = paired(gts, res)?;
        if items.is_empty() {
            return Ok(ScoreOutput::single(0.0, Vec::new()));
        }

        let input: Vec<SpiceInput> = items
            .iter()
            .map(|&(image_id, test, refs)| SpiceInput {
                image_id,
                test,
                refs,
            })
            .collect();
        let mut in_file = NamedTempFile::new()?;
        serde_json::to_writer(&mut in_file, &input)?;
        in_file.flush()?;
        let out_file = NamedTempFile::new()?;

        if let Some(cache_dir) = &self.cache_dir {
            fs::create_dir_all(cache_dir)?;
        }

        let mut command = self.command(in_file.path(), out_file.path());
        debug!("spice command\t{:?}", command);
        info!("running SPICE on {} captions", input.len());
        let output = command.output().map_err(|source| ScorerError::Spawn {
            program: self.java.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ScorerError::Process {
                program: self.java.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let fp = File::open(out_file.path())?;
        let per_item = read_scores(BufReader::new(fp), items.iter().map(|item| item.0))?;
        Ok(ScoreOutput::single(mean(&per_item), per_item))
    }
}
