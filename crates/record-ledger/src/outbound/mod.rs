//! Driven adapters implementing [`crate::ports::LedgerStore`].

use crate::ports::LedgerStoreError;

mod atomic_io;
mod file;
mod memory;

pub use file::FileLedger;
pub use memory::MemoryLedger;

/// Refuse writes under the empty key. Reads of it simply find nothing.
fn reject_empty_key(key: &str) -> Result<(), LedgerStoreError> {
    if key.is_empty() {
        return Err(LedgerStoreError::rejected("key must not be empty"));
    }
    Ok(())
}
