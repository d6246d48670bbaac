use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::captions::TokenizedCaptions;
use crate::scorer::{paired, ScoreOutput, Scorer, ScorerError};

pub const DEFAULT_METEOR_JAR: &str = "coco-caption/pycocoevalcap/meteor/meteor-1.5.jar";

/// METEOR 1.5, delegated to the Meteor jar running in `-stdio` mode.
///
/// Every item is sent as a `SCORE` line and answered with its match statistics; one final
/// `EVAL` line over all statistics returns the per-item scores and the corpus score.
/// Requires a Java runtime. The jar is started from its own directory so it finds the
/// paraphrase tables that ship next to it.
#[derive(Debug, Clone)]
pub struct Meteor {
    java: String,
    jar: PathBuf,
    max_heap: String,
}

impl Meteor {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>) -> Meteor {
        Meteor {
            java: java.into(),
            jar: jar.into(),
            max_heap: String::from("2G"),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.java);
        command.arg("-jar").arg(format!("-Xmx{}", self.max_heap));
        match (self.jar.parent(), self.jar.file_name()) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => {
                command.current_dir(dir).arg(name);
            }
            _ => {
                command.arg(&self.jar);
            }
        }
        command
            .args(["-", "-", "-stdio", "-l", "en", "-norm"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for Meteor {
    fn default() -> Meteor {
        Meteor::new("java", DEFAULT_METEOR_JAR)
    }
}

/// `|||` separates fields in the stdio protocol, so it cannot appear inside a caption.
fn clean(caption: &str) -> String {
    caption.replace("|||", "").replace("  ", " ")
}

fn score_line(hypo: &str, refs: &[String]) -> String {
    let mut fields = vec![String::from("SCORE")];
    fields.extend(refs.iter().map(|reference| clean(reference)));
    fields.push(clean(hypo));
    fields.join(" ||| ")
}

fn read_reply<R: BufRead>(output: &mut R) -> Result<String, ScorerError> {
    let mut line = String::new();
    if output.read_line(&mut line)? == 0 {
        return Err(ScorerError::ClosedOutput);
    }
    Ok(line.trim().to_string())
}

fn parse_score(line: String) -> Result<f64, ScorerError> {
    line.parse().map_err(|_| ScorerError::Reply(line))
}

/// Runs one scoring session and returns the per-item scores and the corpus score.
fn exchange<W: Write, R: BufRead>(
    input: &mut W,
    output: &mut R,
    items: &[(usize, &str, &[String])],
) -> Result<(Vec<f64>, f64), ScorerError> {
    let mut stats = Vec::with_capacity(items.len());
    for &(_, hypo, refs) in items {
        writeln!(input, "{}", score_line(hypo, refs))?;
        input.flush()?;
        stats.push(read_reply(output)?);
    }

    writeln!(input, "EVAL ||| {}", stats.join(" ||| "))?;
    input.flush()?;
    let per_item = items
        .iter()
        .map(|_| read_reply(output).and_then(parse_score))
        .collect::<Result<Vec<f64>, ScorerError>>()?;
    let aggregate = parse_score(read_reply(output)?)?;
    Ok((per_item, aggregate))
}

impl Scorer for Meteor {
    fn method(&self) -> &str {
        "METEOR"
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

        let mut command = self.command();
        debug!("meteor command\t{:?}", command);
        info!("running METEOR on {} captions", items.len());
        let mut child = command.spawn().map_err(|source| ScorerError::Spawn {
            program: self.java.clone(),
            source,
        })?;
        // dropping stdin at the end of the session lets the jar exit
        let exchanged = match (child.stdin.take(), child.stdout.take()) {
            (Some(mut input), Some(output)) => {
                exchange(&mut input, &mut BufReader::new(output), &items)
            }
            _ => Err(ScorerError::ClosedOutput),
        };

        let finished = child.wait_with_output()?;
        if !finished.status.success() {
            return Err(ScorerError::Process {
                program: self.java.clone(),
                status: finished.status,
                stderr: String::from_utf8_lossy(&finished.stderr).trim().to_string(),
            });
        }
        let (per_item, aggregate) = exchanged?;
        Ok(ScoreOutput::single(aggregate, per_item))
    }
}
