//! File-backed ledger adapter.
//!
//! The whole key space lives in one JSON snapshot:
//!
//! ```json
//! { "version": 1, "entries": { "u1": "eyJuYW1lIjoiQWxpY2UiLCJiYWxhbmNlIjowfQ==" } }
//! ```
//!
//! Values are base64 so the adapter stays agnostic of what the bytes hold.
//! Every access rereads the snapshot under an advisory lock on a hidden
//! `.<name>.lock` file beside it: reads take a shared lock, puts take an
//! exclusive lock, merge into the current snapshot and rewrite it atomically.
//! Handles and processes sharing a path therefore never drop each other's
//! keys.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use fs4::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::atomic_io::write_atomic;
use super::reject_empty_key;
use crate::ports::{LedgerStore, LedgerStoreError};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// Ledger persisted to a JSON snapshot file.
///
/// A missing file opens as an empty ledger; the file is created by the first
/// put. The handle caches nothing, so several handles on one path observe
/// each other's writes.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use record_ledger::{FileLedger, LedgerStore};
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = Utf8PathBuf::try_from(dir.path().join("ledger.json")).expect("utf-8 path");
///
/// let ledger = FileLedger::open(&path).expect("open ledger");
/// ledger.put("car1", br#"{"carId":"car1","records":[]}"#.to_vec()).expect("put");
///
/// let reopened = FileLedger::open(&path).expect("reopen ledger");
/// assert!(reopened.get("car1").expect("get").is_some());
/// ```
#[derive(Debug)]
pub struct FileLedger {
    dir: Dir,
    file_name: Utf8PathBuf,
    lock_name: String,
    path: Utf8PathBuf,
}

impl FileLedger {
    /// Open the ledger stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Rejected`] when `path` does not name a
    /// file, and [`LedgerStoreError::Unavailable`] when the directory cannot
    /// be opened or the snapshot cannot be read or parsed.
    pub fn open(path: &Utf8Path) -> Result<Self, LedgerStoreError> {
        let Some(file_name) = path.file_name() else {
            return Err(LedgerStoreError::rejected(format!(
                "ledger path '{path}' must name a file"
            )));
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            LedgerStoreError::unavailable(format!("failed to open directory {parent}: {err}"))
        })?;
        let ledger = Self {
            dir,
            file_name: Utf8PathBuf::from(file_name),
            lock_name: format!(".{file_name}.lock"),
            path: path.to_path_buf(),
        };
        let keys = {
            let _lock = ledger.lock(Access::Shared)?;
            ledger.load()?.len()
        };
        debug!(%path, keys, "file ledger opened");
        Ok(ledger)
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn lock(&self, access: Access) -> Result<File, LedgerStoreError> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        let file = self
            .dir
            .open_with(&self.lock_name, &options)
            .map_err(|err| self.lock_failed(&err))?
            .into_std();
        let locked = match access {
            Access::Shared => FileExt::lock_shared(&file),
            Access::Exclusive => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|err| self.lock_failed(&err))?;
        Ok(file)
    }

    fn lock_failed(&self, err: &io::Error) -> LedgerStoreError {
        LedgerStoreError::unavailable(format!("failed to lock {}: {err}", self.path))
    }

    fn load(&self) -> Result<BTreeMap<String, Vec<u8>>, LedgerStoreError> {
        load_entries(&self.dir, self.file_name.as_str(), &self.path)
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<(), LedgerStoreError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries: entries
                .iter()
                .map(|(key, value)| (key.clone(), STANDARD.encode(value)))
                .collect(),
        };
        let contents = serde_json::to_vec_pretty(&snapshot).map_err(|err| {
            LedgerStoreError::unavailable(format!("failed to serialize snapshot: {err}"))
        })?;
        write_atomic(&self.dir, &self.file_name, &contents)
    }
}

fn load_entries(
    dir: &Dir,
    file_name: &str,
    path: &Utf8Path,
) -> Result<BTreeMap<String, Vec<u8>>, LedgerStoreError> {
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => {
            return Err(LedgerStoreError::unavailable(format!(
                "failed to read {path}: {err}"
            )));
        }
    };
    let snapshot: Snapshot = serde_json::from_str(&contents).map_err(|err| {
        LedgerStoreError::unavailable(format!("invalid ledger snapshot {path}: {err}"))
    })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(LedgerStoreError::unavailable(format!(
            "unsupported ledger snapshot version {} in {path}",
            snapshot.version
        )));
    }
    snapshot
        .entries
        .into_iter()
        .map(|(key, value)| match STANDARD.decode(value.as_bytes()) {
            Ok(bytes) => Ok((key, bytes)),
            Err(err) => Err(LedgerStoreError::unavailable(format!(
                "invalid value for key '{key}' in {path}: {err}"
            ))),
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Access {
    Shared,
    Exclusive,
}

impl LedgerStore for FileLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerStoreError> {
        let _lock = self.lock(Access::Shared)?;
        let mut entries = self.load()?;
        Ok(entries.remove(key))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerStoreError> {
        reject_empty_key(key)?;
        let _lock = self.lock(Access::Exclusive)?;
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value);
        self.persist(&entries)
    }
}
