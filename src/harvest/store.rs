//! Append-only result store.
//!
//! The file is read once when opened to build the dedup set, then kept open
//! in append mode for the rest of the run. Lines are never rewritten.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::harvest::formats::{FormatError, RecordFormat};
use crate::model::LinkRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on result store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot store link: {0}")]
    UnencodableLink(#[from] FormatError),
}

pub struct ResultStore {
    path: PathBuf,
    format: RecordFormat,
    known: HashSet<String>,
    writer: File,
}

impl ResultStore {
    /// Opens (creating if absent) the store at `path` and loads every recorded link.
    pub fn open(path: impl Into<PathBuf>, format: RecordFormat) -> Result<Self, StoreError> {
        let path = path.into();
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let known = Self::load(&path, format)?;
        debug!(path = %path.display(), known = known.len(), "Result store loaded");

        Ok(Self {
            path,
            format,
            known,
            writer,
        })
    }

    /// Reads the set of links recorded in the file at `path`.
    ///
    /// A missing file is an empty set. Lines that are not valid UTF-8 or not
    /// records in `format` are skipped.
    pub fn load(path: &Path, format: RecordFormat) -> Result<HashSet<String>, StoreError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut links = HashSet::new();
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                continue;
            };
            if let Some(link) = format.parse_link(line) {
                links.insert(link.to_string());
            }
        }
        Ok(links)
    }

    pub fn contains(&self, link: &str) -> bool {
        self.known.contains(link)
    }

    /// Appends `record` unless its link is already stored.
    ///
    /// Returns `Ok(true)` when a line was written. Each line is flushed before
    /// returning so an interrupted run keeps everything appended so far.
    pub fn append(&mut self, record: &LinkRecord) -> Result<bool, StoreError> {
        if self.known.contains(&record.link) {
            return Ok(false);
        }

        let mut line = self.format.encode(record)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        self.known.insert(record.link.clone());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }
}
