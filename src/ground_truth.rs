use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};

/// Zero-based column holding the reference caption.
pub const CAPTION_FIELD: usize = 5;

/// Reference captions keyed by row number, starting at 1.
///
/// Identifiers come from the row position, never from the row contents, so they are
/// unique and dense by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    captions: BTreeMap<usize, String>,
}

impl GroundTruth {
    pub fn from_reader<R: Read>(stream: R) -> Result<GroundTruth> {
        read_rows(stream, Path::new("-"))
    }

    pub fn load(path: &Path) -> Result<GroundTruth> {
        let fp = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ground_truth = read_rows(fp, path)?;
        info!(
            "| Loading GT. file: {}, #videos: {}",
            path.display(),
            ground_truth.len()
        );
        Ok(ground_truth)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.captions.contains_key(&id)
    }

    pub fn caption(&self, id: usize) -> Option<&str> {
        self.captions.get(&id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.captions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}

impl FromIterator<String> for GroundTruth {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        GroundTruth {
            captions: (1..).zip(iter).collect(),
        }
    }
}

fn read_rows<R: Read>(mut stream: R, path: &Path) -> Result<GroundTruth> {
    let mut data = Vec::new();
    stream.read_to_end(&mut data).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(data.as_slice());

    // csv skips empty lines, so blank rows only show up as extra line breaks
    let blank_row = |row| Error::ShortRow {
        path: path.to_path_buf(),
        row,
        fields: 0,
    };
    let mut captions = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut next_line = 1;
    while reader.read_record(&mut record).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })? {
        let row = captions.len() + 1;
        let end = reader.position();
        let terminated = end.byte() < data.len() as u64 || data.ends_with(b"\n");
        let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
        next_line += embedded as u64 + u64::from(terminated);
        if end.line() > next_line {
            return Err(blank_row(row));
        }

        let caption = record.get(CAPTION_FIELD).ok_or_else(|| Error::ShortRow {
            path: path.to_path_buf(),
            row,
            fields: record.len(),
        })?;
        captions.push(caption.trim_end_matches('\r').to_string());
    }
    if reader.position().line() > next_line {
        return Err(blank_row(captions.len() + 1));
    }

    Ok(captions.into_iter().collect())
}
