//! Port for the external key-value ledger.
//!
//! The ledger stores opaque bytes under string keys. Both calls take effect
//! immediately within the invocation that makes them; isolation between
//! concurrent invocations is the ledger's responsibility.

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerStoreError {
        /// The ledger could not be reached or its state could not be read.
        Unavailable { message: String } => "ledger unavailable: {message}",
        /// The ledger refused the call.
        Rejected { message: String } => "ledger rejected the call: {message}",
    }
}

/// Key-value access to the ledger for a single invocation.
///
/// Implementations must not retry internally; failures are reported to the
/// caller, which aborts the invocation.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore: Send + Sync {
    /// Read the bytes stored under `key`.
    ///
    /// Returns `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError`] when the ledger cannot serve the read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError`] when the ledger refuses or fails the
    /// write. Nothing is stored in that case.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerStoreError>;
}

/// Fixture store for tests that do not inspect persisted state.
///
/// Every read reports an absent key and every write is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerStore;

impl LedgerStore for FixtureLedgerStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, LedgerStoreError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), LedgerStoreError> {
        Ok(())
    }
}
