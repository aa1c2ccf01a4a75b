//! User point balances.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{Entity, EntityKind};

/// Balance transformation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// The payment exceeds the current balance.
    #[error("insufficient points: balance {balance}, requested {requested}")]
    Insufficient {
        /// Balance before the payment.
        balance: i64,
        /// Points requested by the payment.
        requested: i64,
    },
    /// The new balance does not fit in a signed 64-bit integer.
    #[error("balance overflow: balance {balance}, points {points}")]
    Overflow {
        /// Balance before the change.
        balance: i64,
        /// Points being applied.
        points: i64,
    },
}

/// A point-holding user.
///
/// The ledger key identifying a user is separate from `name`. Users created
/// implicitly by a first receipt of points take the key as their name.
///
/// ## Invariants
/// - Payments never take `balance` below zero. Receipts are not bounded: a
///   negative receipt under the permissive points policy can.
///
/// # Example
///
/// ```
/// use record_ledger::{BalanceError, User};
///
/// let mut user = User::new("Alice");
/// user.receive(50).expect("receive");
/// user.pay(30).expect("pay");
/// assert_eq!(user.balance(), 20);
///
/// assert_eq!(
///     user.pay(25),
///     Err(BalanceError::Insufficient { balance: 20, requested: 25 })
/// );
/// assert_eq!(user.balance(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    name: String,
    balance: i64,
}

impl User {
    /// Build a user with a zero balance.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_balance(name, 0)
    }

    /// Build a user holding `balance` points.
    #[must_use]
    pub fn with_balance(name: impl Into<String>, balance: i64) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }

    /// Display name of the user.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current point balance.
    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Credit `points` to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Overflow`] if the sum does not fit; the balance
    /// is left unchanged.
    pub fn receive(&mut self, points: i64) -> Result<(), BalanceError> {
        self.balance = self
            .balance
            .checked_add(points)
            .ok_or(BalanceError::Overflow {
                balance: self.balance,
                points,
            })?;
        Ok(())
    }

    /// Debit `points` from the balance.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Insufficient`] when `balance < points` and
    /// [`BalanceError::Overflow`] when the difference does not fit. The
    /// balance is left unchanged on error.
    pub fn pay(&mut self, points: i64) -> Result<(), BalanceError> {
        if self.balance < points {
            return Err(BalanceError::Insufficient {
                balance: self.balance,
                requested: points,
            });
        }
        self.balance = self
            .balance
            .checked_sub(points)
            .ok_or(BalanceError::Overflow {
                balance: self.balance,
                points,
            })?;
        Ok(())
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
}
