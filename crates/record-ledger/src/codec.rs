//! Canonical byte encoding for ledger entities.
//!
//! Entities are stored as compact JSON. Field names match the records written
//! by existing ledger clients (`name`/`balance` for users, `carId`/`records`
//! for cars), so values written elsewhere decode here unchanged. Decoding is
//! strict: missing fields, unknown fields, and type mismatches all fail, which
//! is how a user stored under a car key (or the reverse) is detected.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The entity shapes held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A point-holding user.
    User,
    /// A car with its service records.
    Car,
}

impl EntityKind {
    /// Lowercase label used in log fields and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Car => "car",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored under a single ledger key.
pub trait Entity: Serialize + DeserializeOwned {
    /// Shape tag reported in errors and logs.
    const KIND: EntityKind;
}

/// Encoding and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The entity could not be serialized.
    #[error("failed to marshal {kind} data: {message}")]
    Encode {
        /// Shape being encoded.
        kind: EntityKind,
        /// Serializer error message.
        message: String,
    },
    /// The stored bytes do not hold the expected entity shape.
    #[error("failed to unmarshal {kind} data: {message}")]
    Decode {
        /// Shape the bytes were expected to hold.
        kind: EntityKind,
        /// Parser error message.
        message: String,
    },
}

/// Encode an entity into its stored byte form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails. The entity types in
/// this crate always serialize, so this only surfaces for foreign
/// [`Entity`] implementations.
///
/// # Example
///
/// ```
/// use record_ledger::{User, encode};
///
/// let bytes = encode(&User::new("Alice")).expect("encode user");
/// assert_eq!(bytes, br#"{"name":"Alice","balance":0}"#);
/// ```
pub fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(entity).map_err(|err| CodecError::Encode {
        kind: E::KIND,
        message: err.to_string(),
    })
}

/// Encode an entity into its stored form as text.
///
/// Read operations hand this text to callers, matching what a direct ledger
/// query of the key would return.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_text<E: Entity>(entity: &E) -> Result<String, CodecError> {
    serde_json::to_string(entity).map_err(|err| CodecError::Encode {
        kind: E::KIND,
        message: err.to_string(),
    })
}

/// Decode stored bytes into an entity.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] when the bytes are malformed or hold a
/// different shape.
///
/// # Example
///
/// ```
/// use record_ledger::{Car, CodecError, User, decode};
///
/// let car: Car = decode(br#"{"carId":"car1","records":["oil change"]}"#).expect("decode car");
/// assert_eq!(car.records(), ["oil change"]);
///
/// let mismatch = decode::<User>(br#"{"carId":"car1","records":[]}"#);
/// assert!(matches!(mismatch, Err(CodecError::Decode { .. })));
/// ```
pub fn decode<E: Entity>(bytes: &[u8]) -> Result<E, CodecError> {
    serde_json::from_slice(bytes).map_err(|err| CodecError::Decode {
        kind: E::KIND,
        message: err.to_string(),
    })
}
