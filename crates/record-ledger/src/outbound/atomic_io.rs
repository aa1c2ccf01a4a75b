//! Atomic snapshot writes for the file ledger.
//!
//! The snapshot is written to a hidden temporary file beside the target and
//! renamed over it, so a reader never observes a half-written ledger.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::Utf8Path;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::ports::LedgerStoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
///
/// `file_name` must be a bare file name; the caller resolves the directory.
pub(super) fn write_atomic(
    dir: &Dir,
    file_name: &Utf8Path,
    contents: &[u8],
) -> Result<(), LedgerStoreError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{file_name}.tmp.{}.{counter}", std::process::id());

    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        discard_temp(dir, &tmp_name);
        return Err(write_failed(file_name, &err));
    }
    if let Err(err) = rename_over(dir, &tmp_name, file_name.as_str()) {
        discard_temp(dir, &tmp_name);
        return Err(write_failed(file_name, &err));
    }
    sync_directory(dir);
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn discard_temp(dir: &Dir, tmp_name: &str) {
    if let Err(err) = dir.remove_file(tmp_name) {
        debug!(%err, tmp_name, "temporary ledger snapshot not removed");
    }
}

fn sync_directory(dir: &Dir) {
    if let Err(err) = dir.open(".").and_then(|handle| handle.sync_all()) {
        debug!(%err, "ledger directory sync skipped");
    }
}

fn write_failed(file_name: &Utf8Path, err: &io::Error) -> LedgerStoreError {
    debug!(%err, %file_name, "ledger snapshot write failed");
    LedgerStoreError::unavailable(format!("failed to write {file_name}: {err}"))
}
