//! Driven ports for the ledger boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod ledger_store;

#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use ledger_store::{FixtureLedgerStore, LedgerStore, LedgerStoreError};
