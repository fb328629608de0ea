//! Append-only write-ahead log for a single replica.
//!
//! Records are newline-delimited `serde_json` objects. Every [`Wal::append`] call writes one
//! line and `fsync`s before returning, so a record is durable the instant the call succeeds.
//! There is no per-record checksum — a record is well-formed iff it parses as JSON and is
//! terminated by `\n`; anything else found before the true end of file is treated as corruption.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Set,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub op: Op,
    pub key: String,
    pub value: String,
}

/// A single replica's durable mutation log.
///
/// Appends are serialized through an internal lock, matching the WAL-then-map lock order the
/// store relies on: callers must hold this lock for the duration of an append before touching
/// the in-memory map.
pub struct Wal {
    file: Mutex<File>,
    path: PathBuf,
}

impl Wal {
    /// Opens (creating if absent) the WAL at `path`, truncating a partial trailing record left
    /// by a crash, and failing with `CorruptLog` if interior corruption is found instead.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(valid_len) = Self::scan_tail(&path)? {
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(valid_len)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Scans the file for the byte offset right after the last complete record. Every
    /// newline-terminated line must parse cleanly or the log is corrupt (interior failure,
    /// fatal). A final line with no trailing newline is a crash-truncated partial write and its
    /// start offset is returned so the caller can truncate back to it.
    fn scan_tail(path: &Path) -> Result<Option<u64>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut offset: u64 = 0;
        let mut line = String::new();

        loop {
            line.clear();
            let start = offset;
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                return Ok(None); // clean EOF, nothing to truncate
            }
            offset += n as u64;

            if !line.ends_with('\n') {
                return Ok(Some(start));
            }

            if serde_json::from_str::<Record>(line.trim_end_matches('\n')).is_err() {
                return Err(StoreError::CorruptLog(format!(
                    "unparseable record at offset {start}"
                )));
            }
        }
    }

    /// Serializes `record`, appends it as one line, and `fsync`s before returning.
    pub fn append(&self, op: Op, key: &str, value: &str) -> Result<(), StoreError> {
        let record = Record {
            op,
            key: key.to_string(),
            value: value.to_string(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Reads every well-formed record in file order. The file was already truncated to its last
    /// complete record on [`Wal::open`], so this should never see a partial tail.
    pub fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;

        let mut records = Vec::new();
        for line in BufReader::new(&mut *file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&line)
                .map_err(|e| StoreError::CorruptLog(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Flushes and releases the underlying file handle.
    pub fn close(&self) -> Result<(), StoreError> {
        let file = self.file.lock();
        file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
