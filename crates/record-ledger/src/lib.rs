//! Ledger-backed record store for user point balances and car service
//! histories.
//!
//! Every operation runs one read-modify-write cycle against an injected
//! [`LedgerStore`]: read the single key named by the call, validate the
//! decoded entity, apply a deterministic transformation, and write the new
//! value back. Nothing is written when any step fails.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use record_ledger::{Dispatcher, LedgerOptions, MemoryLedger, RecordService};
//!
//! let service = RecordService::new(Arc::new(MemoryLedger::new()), LedgerOptions::default());
//! service.create_user("u1", "Alice").expect("create user");
//! service.receive_points("u1", 50).expect("receive points");
//! service.pay_points("u1", 30).expect("pay points");
//!
//! assert_eq!(service.get_user("u1").expect("user exists").balance(), 20);
//!
//! let dispatcher = Dispatcher::new(service);
//! let response = dispatcher
//!     .invoke("GetUser", &["u1".to_owned()])
//!     .expect("invoke GetUser");
//! assert_eq!(response.payload(), Some(r#"{"name":"Alice","balance":20}"#));
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod outbound;
pub mod ports;
pub mod service;

pub use codec::{CodecError, Entity, EntityKind, decode, encode, encode_text};
pub use config::LedgerSettings;
pub use dispatch::{Dispatcher, InvocationResponse, Operation, TxId};
pub use domain::{BalanceError, Car, ErrorCode, LedgerError, Step, User};
pub use outbound::{FileLedger, MemoryLedger};
pub use ports::{FixtureLedgerStore, LedgerStore, LedgerStoreError};
pub use service::{LedgerOptions, OverwritePolicy, PointsPolicy, RecordService};
