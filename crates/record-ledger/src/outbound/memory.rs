//! In-memory ledger adapter.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::reject_empty_key;
use crate::ports::{LedgerStore, LedgerStoreError};

/// Thread-safe in-memory ledger.
///
/// Suitable for tests and for embedding the record service without a durable
/// backend. Writes under the empty key are refused, matching the external
/// ledger; reading it finds nothing.
///
/// # Example
///
/// ```
/// use record_ledger::{LedgerStore, MemoryLedger};
///
/// let ledger = MemoryLedger::new();
/// ledger.put("car1", b"{}".to_vec()).expect("put");
///
/// assert_eq!(ledger.get("car1").expect("get"), Some(b"{}".to_vec()));
/// assert!(ledger.put("", Vec::new()).is_err());
/// assert_eq!(ledger.get("").expect("get"), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a value.
    ///
    /// A poisoned lock still reports the stored count; a put never leaves the
    /// map half-updated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerStoreError {
    debug!("memory ledger lock poisoned");
    LedgerStoreError::unavailable("memory ledger lock poisoned")
}

impl LedgerStore for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerStoreError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerStoreError> {
        reject_empty_key(key)?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_owned(), value);
        Ok(())
    }
}
