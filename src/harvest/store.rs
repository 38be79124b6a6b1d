//! Append-only JSON file of harvested listings.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::PersistError;
use crate::models::ListingRecord;

/// JSON array of listings on disk, extended one batch at a time.
///
/// Each append rewrites the whole file through a temporary sibling that is
/// renamed over the target, so readers see either the previous or the new
/// collection, never a partial one. Only one writer per file is supported.
#[derive(Debug, Clone)]
pub struct AppendStore {
    path: PathBuf,
}

impl AppendStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record persisted so far. A missing file is an empty collection.
    pub fn load(&self) -> Result<Vec<ListingRecord>, PersistError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&content).map_err(|source| PersistError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Add `batch` after the stored records. Returns the new total.
    ///
    /// An empty batch writes nothing, not even to create the file.
    pub fn append(&self, batch: &[ListingRecord]) -> Result<usize, PersistError> {
        if batch.is_empty() {
            return Ok(self.load()?.len());
        }

        let mut records = self.load()?;
        records.extend_from_slice(batch);
        self.write_all(&records)?;

        debug!(
            "Appended {} listings to {} ({} total)",
            batch.len(),
            self.path.display(),
            records.len()
        );
        Ok(records.len())
    }

    fn write_all(&self, records: &[ListingRecord]) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |source| PersistError::Write {
            path: self.path.clone(),
            source,
        };

        std::fs::create_dir_all(&dir).map_err(write_err)?;
        let tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, records)
                .map_err(|e| self.encode_error(e))?;
            writer.flush().map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;

        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Serializer failures from the underlying writer are write errors.
    fn encode_error(&self, e: serde_json::Error) -> PersistError {
        if e.is_io() {
            PersistError::Write {
                path: self.path.clone(),
                source: e.into(),
            }
        } else {
            PersistError::Encode(e)
        }
    }
}
