//! Operation error taxonomy.
//!
//! Errors are values returned to the caller of an operation; none are retried
//! or recovered internally. Each variant names the step that failed and the
//! ledger key involved so the caller can tell a corrupt record from a missing
//! one without parsing the message.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BalanceError;
use crate::codec::{CodecError, EntityKind};
use crate::ports::LedgerStoreError;

/// Stable machine-readable code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The invocation was malformed.
    InvalidRequest,
    /// The operation requires a record that does not exist.
    NotFound,
    /// The create guard found a record already stored under the key.
    AlreadyExists,
    /// A payment exceeds the stored balance.
    InsufficientBalance,
    /// Negative points were rejected by the strict points policy.
    InvalidPoints,
    /// The new balance is out of the representable range.
    BalanceOverflow,
    /// Stored bytes do not hold the expected entity shape.
    Corrupted,
    /// An entity could not be encoded.
    EncodeFailed,
    /// The ledger store failed or refused the call.
    StoreFailure,
}

/// Step of the read-modify-write cycle at which an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Reading the current value from the store.
    Get,
    /// Decoding the stored bytes.
    Unmarshal,
    /// Encoding the new value.
    Marshal,
    /// Writing the new value to the store.
    Put,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Unmarshal => "unmarshal",
            Self::Marshal => "marshal",
            Self::Put => "put",
        })
    }
}

/// Failure of a single ledger operation.
///
/// # Examples
/// ```
/// use record_ledger::{EntityKind, ErrorCode, LedgerError};
///
/// let err = LedgerError::NotFound {
///     kind: EntityKind::Car,
///     key: "car9".to_owned(),
/// };
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(!err.is_fatal());
/// assert_eq!(err.to_string(), "car 'car9' not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The store failed while reading or writing the key.
    #[error("failed to {step} {kind} '{key}': {source}")]
    Store {
        /// [`Step::Get`] or [`Step::Put`].
        step: Step,
        /// Entity shape being read or written.
        kind: EntityKind,
        /// Ledger key involved.
        key: String,
        /// Error reported by the store adapter.
        #[source]
        source: LedgerStoreError,
    },
    /// The stored bytes could not be decoded.
    #[error("failed to unmarshal {kind} '{key}': {message}")]
    Decode {
        /// Entity shape the key was expected to hold.
        kind: EntityKind,
        /// Ledger key involved.
        key: String,
        /// Parser error message.
        message: String,
    },
    /// The new value could not be encoded.
    #[error("failed to marshal {kind} '{key}': {message}")]
    Encode {
        /// Entity shape being encoded.
        kind: EntityKind,
        /// Ledger key involved.
        key: String,
        /// Serializer error message.
        message: String,
    },
    /// The operation requires an existing record.
    #[error("{kind} '{key}' not found")]
    NotFound {
        /// Entity shape that was expected.
        kind: EntityKind,
        /// Ledger key that holds no value.
        key: String,
    },
    /// The create guard found an existing record.
    #[error("{kind} '{key}' already exists")]
    AlreadyExists {
        /// Entity shape being created.
        kind: EntityKind,
        /// Ledger key that already holds a value.
        key: String,
    },
    /// The payment exceeds the stored balance.
    #[error("insufficient points for user '{key}': balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// User key.
        key: String,
        /// Stored balance.
        balance: i64,
        /// Points requested.
        requested: i64,
    },
    /// The new balance does not fit in a signed 64-bit integer.
    #[error("balance overflow for user '{key}': balance {balance}, points {points}")]
    BalanceOverflow {
        /// User key.
        key: String,
        /// Stored balance.
        balance: i64,
        /// Points being applied.
        points: i64,
    },
    /// Negative points were rejected before touching the store.
    #[error("points must not be negative, got {points}")]
    InvalidPoints {
        /// Points supplied by the caller.
        points: i64,
    },
    /// The invocation could not be mapped to an operation.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },
}

impl LedgerError {
    /// Build an [`LedgerError::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Attach the ledger key to a codec failure.
    #[must_use]
    pub fn codec(key: impl Into<String>, error: CodecError) -> Self {
        match error {
            CodecError::Encode { kind, message } => Self::Encode {
                kind,
                key: key.into(),
                message,
            },
            CodecError::Decode { kind, message } => Self::Decode {
                kind,
                key: key.into(),
                message,
            },
        }
    }

    /// Attach the user key to a balance failure.
    #[must_use]
    pub fn balance(key: impl Into<String>, error: BalanceError) -> Self {
        match error {
            BalanceError::Insufficient { balance, requested } => Self::InsufficientBalance {
                key: key.into(),
                balance,
                requested,
            },
            BalanceError::Overflow { balance, points } => Self::BalanceOverflow {
                key: key.into(),
                balance,
                points,
            },
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Store { .. } => ErrorCode::StoreFailure,
            Self::Decode { .. } => ErrorCode::Corrupted,
            Self::Encode { .. } => ErrorCode::EncodeFailed,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            Self::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            Self::BalanceOverflow { .. } => ErrorCode::BalanceOverflow,
            Self::InvalidPoints { .. } => ErrorCode::InvalidPoints,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// Whether the failure points at the store or stored data rather than
    /// at the caller's input.
    ///
    /// Fatal errors signal an unreachable store, data corruption, or an ID
    /// namespace collision. The rest are expected and correctable by the
    /// caller.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Store { .. } | Self::Decode { .. } | Self::Encode { .. }
        )
    }

    /// Failing step, for errors raised inside the read-modify-write cycle.
    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Store { step, .. } => Some(*step),
            Self::Decode { .. } => Some(Step::Unmarshal),
            Self::Encode { .. } => Some(Step::Marshal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store_failure(step: Step) -> LedgerError {
        LedgerError::Store {
            step,
            kind: EntityKind::User,
            key: "u1".to_owned(),
            source: LedgerStoreError::unavailable("peer offline"),
        }
    }

    #[test]
    fn store_errors_name_step_and_key() {
        let err = store_failure(Step::Put);

        assert_eq!(
            err.to_string(),
            "failed to put user 'u1': ledger unavailable: peer offline"
        );
        assert_eq!(err.step(), Some(Step::Put));
    }

    #[test]
    fn codec_errors_keep_kind_and_gain_key() {
        let err = LedgerError::codec(
            "car1",
            CodecError::Decode {
                kind: EntityKind::Car,
                message: "expected value".to_owned(),
            },
        );

        assert_eq!(
            err,
            LedgerError::Decode {
                kind: EntityKind::Car,
                key: "car1".to_owned(),
                message: "expected value".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "failed to unmarshal car 'car1': expected value");
    }

    #[test]
    fn balance_errors_map_to_user_correctable_variants() {
        let err = LedgerError::balance(
            "u1",
            BalanceError::Insufficient {
                balance: 20,
                requested: 25,
            },
        );

        assert_eq!(err.code(), ErrorCode::InsufficientBalance);
        assert_eq!(
            err.to_string(),
            "insufficient points for user 'u1': balance 20, requested 25"
        );
    }

    #[rstest]
    #[case::store(store_failure(Step::Get), ErrorCode::StoreFailure, true)]
    #[case::decode(
        LedgerError::Decode { kind: EntityKind::User, key: "k".to_owned(), message: "m".to_owned() },
        ErrorCode::Corrupted,
        true
    )]
    #[case::encode(
        LedgerError::Encode { kind: EntityKind::Car, key: "k".to_owned(), message: "m".to_owned() },
        ErrorCode::EncodeFailed,
        true
    )]
    #[case::not_found(
        LedgerError::NotFound { kind: EntityKind::User, key: "k".to_owned() },
        ErrorCode::NotFound,
        false
    )]
    #[case::exists(
        LedgerError::AlreadyExists { kind: EntityKind::Car, key: "k".to_owned() },
        ErrorCode::AlreadyExists,
        false
    )]
    #[case::invalid_points(LedgerError::InvalidPoints { points: -1 }, ErrorCode::InvalidPoints, false)]
    #[case::invalid_request(LedgerError::invalid_request("bad"), ErrorCode::InvalidRequest, false)]
    fn codes_and_fatality(
        #[case] err: LedgerError,
        #[case] code: ErrorCode,
        #[case] fatal: bool,
    ) {
        assert_eq!(err.code(), code);
        assert_eq!(err.is_fatal(), fatal);
    }

    #[test]
    fn error_codes_serialize_in_snake_case() {
        let json = serde_json::to_string(&ErrorCode::InsufficientBalance).expect("serialize");

        assert_eq!(json, "\"insufficient_balance\"");
    }
}
