//! Dataset table loading.
//!
//! Input tables are CSV with a header row, optionally gzip-compressed. One
//! column holds the record id; a list of attribute columns holds the
//! sensitive text that becomes the record's q-gram set.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use encoder::{Dataset, Record};
use flate2::read::GzDecoder;
use qgram::record_qgrams;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info, warn};

use crate::PipelineError;

/// Location and column layout of one input table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSpec {
    pub path: PathBuf,
    /// Zero-based index of the record id column.
    pub id_column: usize,
    /// Zero-based indices of the sensitive attribute columns.
    pub attributes: Vec<usize>,
}

/// A dataset plus what loading it observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    /// Header names of the attribute columns, in configured order.
    pub attributes: Vec<String>,
    /// Rows dropped for a blank attribute or an empty q-gram set.
    pub dropped: usize,
    /// Rows that replaced an earlier row with the same id.
    pub duplicates: usize,
}

/// Load the table at `spec.path`; `.gz` files are decompressed on the fly.
pub fn load_dataset(name: &str, spec: &DatasetSpec, q: usize) -> Result<LoadedDataset, PipelineError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "rse.load_dataset",
        dataset = name,
        path = %spec.path.display()
    );
    let _guard = span.enter();

    let result = open_table(&spec.path).and_then(|reader| {
        read_dataset(name, reader, spec.id_column, &spec.attributes, q, &spec.path)
    });
    match result {
        Ok(loaded) => {
            if loaded.duplicates > 0 {
                warn!(duplicates = loaded.duplicates, "duplicate record ids; later rows win");
            }
            info!(
                records = loaded.dataset.len(),
                dropped = loaded.dropped,
                elapsed_micros = start.elapsed().as_micros(),
                "load_dataset_success"
            );
            Ok(loaded)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "load_dataset_failure"
            );
            Err(err)
        }
    }
}

fn open_table(path: &Path) -> Result<Box<dyn Read>, PipelineError> {
    let file = File::open(path).map_err(|err| PipelineError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Parse a headed CSV table into records.
///
/// `path` only labels errors. Ids are trimmed and lowercased; a later row
/// with an id already seen replaces the earlier one.
pub fn read_dataset<R: Read>(
    name: &str,
    reader: R,
    id_column: usize,
    attributes: &[usize],
    q: usize,
    path: &Path,
) -> Result<LoadedDataset, PipelineError> {
    let table_error = |line: u64, message: String| PipelineError::Table {
        path: path.to_path_buf(),
        line,
        message,
    };
    let csv_error = |err: csv::Error| {
        let line = err.position().map_or(0, |p| p.line());
        table_error(line, err.to_string())
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    for &column in std::iter::once(&id_column).chain(attributes) {
        if column >= headers.len() {
            return Err(table_error(
                1,
                format!("column {column} is beyond the {} header columns", headers.len()),
            ));
        }
    }
    let attribute_names: Vec<String> = attributes
        .iter()
        .filter_map(|&c| headers.get(c))
        .map(|h| h.trim().to_string())
        .collect();

    let mut records: Vec<Record> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0;
    let mut duplicates = 0;

    for row in rdr.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map_or(0, |p| p.line());
        let field = |column: usize| {
            row.get(column).ok_or_else(|| {
                table_error(
                    line,
                    format!("row has {} fields, column {column} is missing", row.len()),
                )
            })
        };

        let id = field(id_column)?.trim().to_lowercase();
        let values = attributes
            .iter()
            .map(|&c| field(c))
            .collect::<Result<Vec<&str>, _>>()?;
        let Some(qgrams) = record_qgrams(&values, q) else {
            debug!(line, record_id = %id, "row dropped: blank attribute");
            dropped += 1;
            continue;
        };

        let record = Record::new(id.clone(), qgrams);
        match positions.get(&id) {
            Some(&at) => {
                debug!(line, record_id = %id, "duplicate record id");
                duplicates += 1;
                records[at] = record;
            }
            None => {
                positions.insert(id, records.len());
                records.push(record);
            }
        }
    }

    Ok(LoadedDataset {
        dataset: Dataset::new(name, records),
        attributes: attribute_names,
        dropped,
        duplicates,
    })
}

/// Fail unless both datasets name the same attributes in the same order.
pub fn check_attributes(left: &LoadedDataset, right: &LoadedDataset) -> Result<(), PipelineError> {
    if left.attributes != right.attributes {
        return Err(PipelineError::AttributeMismatch {
            left: left.attributes.clone(),
            right: right.attributes.clone(),
        });
    }
    Ok(())
}
