//! Signature output files: `rec_id,signature` CSV sorted by record id.
//!
//! Files are first written to temporaries in the target directory and only
//! renamed into place once every output of a run has been written.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use encoder::Signature;
use tempfile::NamedTempFile;

use crate::PipelineError;

pub fn write_signatures<W: Write>(
    signatures: &BTreeMap<String, Signature>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["rec_id", "signature"])?;
    for (id, signature) in signatures {
        out.write_record([id.as_str(), signature.to_bit_string().as_str()])?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_signatures_path(
    signatures: &BTreeMap<String, Signature>,
    path: &Path,
) -> Result<(), PipelineError> {
    let mut staged = StagedOutputs::new();
    staged.stage(path, |file| write_signatures(signatures, file))?;
    staged.commit()
}

/// Output files held as temporaries until [`commit`](Self::commit).
///
/// Dropping an uncommitted `StagedOutputs` deletes every temporary, so a
/// failed run leaves no partial outputs behind. Commit renames in staging
/// order; a failed rename leaves the earlier targets already in place.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write `path`'s future contents to a temporary beside it.
    pub fn stage<F, E>(&mut self, path: &Path, write: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&mut File) -> Result<(), E>,
        E: fmt::Display,
    {
        let io_error = |message: String| PipelineError::Io {
            path: path.to_path_buf(),
            message,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| io_error(err.to_string()))?;
        write(tmp.as_file_mut()).map_err(|err| io_error(err.to_string()))?;
        self.staged.push((tmp, path.to_path_buf()));
        Ok(())
    }

    /// Move every staged file onto its target path.
    pub fn commit(self) -> Result<(), PipelineError> {
        for (tmp, path) in self.staged {
            tmp.persist(&path).map_err(|err| PipelineError::Io {
                path: path.clone(),
                message: err.error.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Read a file written by [`write_signatures`].
pub fn read_signatures<R: Read>(
    reader: R,
    path: &Path,
) -> Result<BTreeMap<String, Signature>, PipelineError> {
    let table_error = |line: u64, message: String| PipelineError::Table {
        path: path.to_path_buf(),
        line,
        message,
    };
    let mut rdr = csv::Reader::from_reader(reader);
    let mut signatures = BTreeMap::new();
    for row in rdr.deserialize::<(String, Signature)>() {
        let (id, signature) = row.map_err(|err| {
            let line = err.position().map_or(0, |p| p.line());
            table_error(line, err.to_string())
        })?;
        signatures.insert(id, signature);
    }
    Ok(signatures)
}
