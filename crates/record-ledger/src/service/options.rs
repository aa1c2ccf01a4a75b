//! Behaviour switches for the record service.
//!
//! The defaults reproduce the ledger contract as deployed: creates overwrite
//! whatever is stored and points are applied with their sign. The stricter
//! alternatives change observable behaviour and are opt-in.

/// Handling of negative `points` arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointsPolicy {
    /// Apply points with their sign. A negative receipt lowers the balance
    /// and a negative payment raises it, bypassing the payment floor check.
    #[default]
    Permissive,
    /// Reject negative points before touching the store.
    Strict,
}

/// Handling of creates targeting a key that already holds a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace the stored value without reading it. Prior balances and
    /// service records are discarded.
    #[default]
    Overwrite,
    /// Read the key first and fail with `AlreadyExists` if it holds a value.
    Guard,
}

/// Options applied to every operation of a [`super::RecordService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Negative points handling.
    pub points: PointsPolicy,
    /// Create-over-existing handling.
    pub overwrite: OverwritePolicy,
}

impl LedgerOptions {
    /// Options with both strict policies enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            points: PointsPolicy::Strict,
            overwrite: OverwritePolicy::Guard,
        }
    }
}
