use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One generated caption from a submission file.
///
/// Submissions are a flat JSON array of these records. `video_id` may be written as a
/// string or an integer; it is kept as text either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(deserialize_with = "string_or_integer")]
    pub video_id: String,
    pub caption: String,
}

impl Prediction {
    pub fn new(video_id: impl Into<String>, caption: impl Into<String>) -> Prediction {
        Prediction {
            video_id: video_id.into(),
            caption: caption.into(),
        }
    }

    /// The ground-truth row this prediction refers to, if `video_id` names one at all.
    ///
    /// Only ASCII digits (after trimming whitespace) are read as an id. Signs are rejected;
    /// leading zeros are not significant, so `"007"` names row 7.
    pub fn ground_truth_id(&self) -> Option<usize> {
        let id = self.video_id.trim();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id.parse().ok()
    }
}

pub fn read_predictions_from_stream<R: Read>(stream: R) -> Result<Vec<Prediction>> {
    parse_predictions(stream, Path::new("-"))
}

pub fn read_predictions(path: &Path) -> Result<Vec<Prediction>> {
    info!("| Loading submission...");
    let fp = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let predictions = parse_predictions(BufReader::new(fp), path)?;
    info!("len of results: {}", predictions.len());
    Ok(predictions)
}

fn parse_predictions<R: Read>(stream: R, path: &Path) -> Result<Vec<Prediction>> {
    let json_error = |source| Error::Json {
        path: path.to_path_buf(),
        source,
    };
    let document: Value = serde_json::from_reader(stream).map_err(json_error)?;
    if document.is_array() {
        return serde_json::from_value(document).map_err(json_error);
    }
    let found = match &document {
        Value::Object(fields) if fields.contains_key("results") => {
            "an object with a `results` field"
        }
        Value::Object(_) => "an object",
        Value::Array(_) => "an array",
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
    };
    Err(Error::PredictionShape {
        path: path.to_path_buf(),
        found,
    })
}

fn string_or_integer<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VideoId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match VideoId::deserialize(deserializer)? {
        VideoId::Text(text) => text,
        VideoId::Unsigned(n) => n.to_string(),
        VideoId::Signed(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_flat_array_in_order() {
        let json = r#"[
            {"video_id": "2", "caption": "a dog runs"},
            {"video_id": "1", "caption": "a man speaks"}
        ]"#;
        let predictions = read_predictions_from_stream(json.as_bytes()).unwrap();
        assert_eq!(
            predictions,
            vec![
                Prediction::new("2", "a dog runs"),
                Prediction::new("1", "a man speaks"),
            ]
        );
    }

    #[test]
    fn test_integer_video_ids_are_accepted() {
        let json = r#"[{"video_id": 7, "caption": "x"}]"#;
        let predictions = read_predictions_from_stream(json.as_bytes()).unwrap();
        assert_eq!(predictions[0].video_id, "7");
        assert_eq!(predictions[0].ground_truth_id(), Some(7));
    }

    #[test]
    fn test_ground_truth_id_coercion() {
        assert_eq!(Prediction::new(" 12 ", "").ground_truth_id(), Some(12));
        assert_eq!(Prediction::new("clip_0001", "").ground_truth_id(), None);
        assert_eq!(Prediction::new("-3", "").ground_truth_id(), None);
        assert_eq!(Prediction::new("+1", "").ground_truth_id(), None);
        assert_eq!(Prediction::new("", "").ground_truth_id(), None);
        assert_eq!(Prediction::new("1 2", "").ground_truth_id(), None);
        assert_eq!(Prediction::new("007", "").ground_truth_id(), Some(7));
    }

    #[test]
    fn test_results_envelope_is_rejected() {
        let json = r#"{"version": "1.0", "results": [], "external_data": {}}"#;
        match read_predictions_from_stream(json.as_bytes()) {
            Err(Error::PredictionShape { found, .. }) => assert!(found.contains("results")),
            other => panic!("expected PredictionShape, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = read_predictions_from_stream("[{".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let json = r#"[{"video_id": "1"}]"#;
        let err = read_predictions_from_stream(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
