use std::fs;
use std::path::Path;

use caption_eval::metrics::{Bleu, Cider, ExactMeteor, Rouge};
use caption_eval::report::write_scores;
use caption_eval::{default_scorers, Error, Evaluator, MetricScores, PtbTokenizer, ScorerEntry};
use tempfile::TempDir;

const REFERENCE: &str = "clip_1\t0\t1\tx\ty\tA man is speaking.\n\
                         clip_2\t0\t1\tx\ty\tTwo dogs run through a park.\n\
                         clip_3\t0\t1\tx\ty\tSomeone pours a cup of coffee.\n";

fn write_inputs(dir: &TempDir, submission: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let reference = dir.path().join("reference.tsv");
    let predictions = dir.path().join("submission.json");
    fs::write(&reference, REFERENCE).unwrap();
    fs::write(&predictions, submission).unwrap();
    (reference, predictions)
}

fn full_registry() -> Vec<ScorerEntry> {
    let bleu = Bleu::new(4);
    let labels = bleu.labels();
    vec![
        ScorerEntry::new(bleu, labels),
        ScorerEntry::new(ExactMeteor::new(), "METEOR"),
        ScorerEntry::new(Rouge::new(), "ROUGE_L"),
        ScorerEntry::new(Cider::new(), "CIDEr"),
    ]
}

#[test]
fn test_minimal_run_writes_meteor() {
    let dir = TempDir::new().unwrap();
    let (reference, submission) =
        write_inputs(&dir, r#"[{"video_id": "1", "caption": "a man speaks"}]"#);

    let evaluator = Evaluator::from_files(
        Some(reference.as_path()),
        Some(submission.as_path()),
        PtbTokenizer::new(),
        default_scorers(ExactMeteor::new()),
    )
    .unwrap();
    assert_eq!(evaluator.ground_truth().len(), 3);
    let output = evaluator.evaluate().unwrap();
    assert_eq!(output.keys().collect::<Vec<_>>(), vec!["METEOR"]);
    assert!((0.0..=1.0).contains(&output["METEOR"]));

    let result = dir.path().join("result.json");
    write_scores(&result, &output).unwrap();
    let written: MetricScores =
        serde_json::from_str(&fs::read_to_string(&result).unwrap()).unwrap();
    assert_eq!(written, output);
}

#[test]
fn test_unknown_video_ids_are_ignored() {
    let dir = TempDir::new().unwrap();
    let (reference, clean) = write_inputs(
        &dir,
        r#"[
            {"video_id": "2", "caption": "two dogs are running in the park"},
            {"video_id": "3", "caption": "a person pours coffee"}
        ]"#,
    );
    let noisy = dir.path().join("noisy.json");
    fs::write(
        &noisy,
        r#"[
            {"video_id": "2", "caption": "two dogs are running in the park"},
            {"video_id": "1000", "caption": "a man speaks"},
            {"video_id": "3", "caption": "a person pours coffee"}
        ]"#,
    )
    .unwrap();

    let score = |submission: &Path| {
        Evaluator::from_files(
            Some(reference.as_path()),
            Some(submission),
            PtbTokenizer::new(),
            full_registry(),
        )
        .unwrap()
        .evaluate()
        .unwrap()
    };
    let clean_scores = score(clean.as_path());
    let noisy_scores = score(noisy.as_path());
    assert_eq!(clean_scores.len(), 7);
    assert_eq!(clean_scores, noisy_scores);
}

#[test]
fn test_short_reference_row_fails() {
    let dir = TempDir::new().unwrap();
    let reference = dir.path().join("reference.tsv");
    let submission = dir.path().join("submission.json");
    fs::write(&reference, "clip_1\t0\t1\tonly four fields\n").unwrap();
    fs::write(&submission, "[]").unwrap();

    let err = Evaluator::from_files(
        Some(reference.as_path()),
        Some(submission.as_path()),
        PtbTokenizer::new(),
        default_scorers(ExactMeteor::new()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::ShortRow { row: 1, fields: 4, .. }));
}

#[test]
fn test_missing_submission_file_fails() {
    let dir = TempDir::new().unwrap();
    let (reference, _) = write_inputs(&dir, "[]");
    let err = Evaluator::from_files(
        Some(reference.as_path()),
        Some(dir.path().join("absent.json").as_path()),
        PtbTokenizer::new(),
        default_scorers(ExactMeteor::new()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::Io { .. }));
}
