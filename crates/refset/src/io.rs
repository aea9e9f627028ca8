//! Reference-set and frequency-table file formats.
//!
//! Both are headerless CSV. A reference-set file holds one set per row (row
//! index = set index). A frequency table holds `q-gram,frequency` rows.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use qgram::QGramSet;
use tracing::{info, warn};

use crate::error::RefSetError;
use crate::pool::ReferenceSetPool;
use crate::weigher::FrequencyTable;

fn headerless<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord, fallback: usize) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback as u64 + 1)
}

/// Parse a reference-set file into a pool.
pub fn read_reference_sets<R: Read>(reader: R) -> Result<ReferenceSetPool, RefSetError> {
    let mut sets = Vec::new();
    for (row, record) in headerless(reader).records().enumerate() {
        let record = record?;
        let line = line_of(&record, row);
        let mut members = QGramSet::new();
        for field in record.iter() {
            if field.is_empty() {
                return Err(RefSetError::Format {
                    line,
                    message: "empty reference-set member".into(),
                });
            }
            if !members.insert(field.to_string()) {
                return Err(RefSetError::Format {
                    line,
                    message: format!("member {field:?} repeated"),
                });
            }
        }
        if members.is_empty() {
            return Err(RefSetError::Format {
                line,
                message: "reference set has no members".into(),
            });
        }
        sets.push(members);
    }
    let pool = ReferenceSetPool::from_sets(sets)?;
    info!(sets = pool.len(), r_length = pool.r_length(), "reference_sets_read");
    Ok(pool)
}

pub fn read_reference_sets_path<P: AsRef<Path>>(path: P) -> Result<ReferenceSetPool, RefSetError> {
    let path = path.as_ref();
    File::open(path)
        .map_err(RefSetError::from)
        .and_then(read_reference_sets)
        .map_err(|err| err.at_path(path))
}

/// Write one row per reference set, members in sorted order.
pub fn write_reference_sets<W: Write>(
    pool: &ReferenceSetPool,
    writer: W,
) -> Result<(), RefSetError> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for set in pool.iter() {
        out.write_record(set.members.iter())?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_reference_sets_path<P: AsRef<Path>>(
    pool: &ReferenceSetPool,
    path: P,
) -> Result<(), RefSetError> {
    let path = path.as_ref();
    File::create(path)
        .map_err(RefSetError::from)
        .and_then(|file| write_reference_sets(pool, file))
        .map_err(|err| err.at_path(path))
}

/// Parse a `q-gram,frequency` table. Later rows for the same q-gram win.
pub fn read_frequency_table<R: Read>(reader: R) -> Result<FrequencyTable, RefSetError> {
    let mut table = FrequencyTable::new();
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    for (row, record) in headerless(reader).records().enumerate() {
        let record = record?;
        let line = line_of(&record, row);
        if record.len() != 2 {
            return Err(RefSetError::Format {
                line,
                message: format!("expected 2 fields, found {}", record.len()),
            });
        }
        let qgram = &record[0];
        let raw = record[1].trim();
        let frequency = raw.parse::<u64>().map_err(|_| RefSetError::Format {
            line,
            message: format!("frequency {raw:?} for {qgram:?} is not a non-negative integer"),
        })?;
        if !seen.insert(qgram.to_string()) {
            duplicates += 1;
        }
        table.insert(qgram, frequency);
    }
    if duplicates > 0 {
        warn!(duplicates, "frequency table repeats q-grams; later rows win");
    }
    info!(qgrams = table.len(), "frequency_table_read");
    Ok(table)
}

pub fn read_frequency_table_path<P: AsRef<Path>>(path: P) -> Result<FrequencyTable, RefSetError> {
    let path = path.as_ref();
    File::open(path)
        .map_err(RefSetError::from)
        .and_then(read_frequency_table)
        .map_err(|err| err.at_path(path))
}
