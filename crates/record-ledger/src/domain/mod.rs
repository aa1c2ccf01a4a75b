//! Domain entities and the operation error taxonomy.
//!
//! Purpose: define the two stored entity shapes and the per-entity
//! transformations applied by the record service. Entities are plain values;
//! all store access lives in [`crate::service`].
//!
//! Public surface:
//! - [`User`]: point balance owner, guarded decrement.
//! - [`Car`]: car identity plus append-only service records.
//! - [`LedgerError`] / [`ErrorCode`]: operation failures and their stable codes.

mod car;
mod error;
mod user;

pub use self::car::Car;
pub use self::error::{ErrorCode, LedgerError, Step};
pub use self::user::{BalanceError, User};
