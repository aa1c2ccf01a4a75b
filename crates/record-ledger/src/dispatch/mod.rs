//! Invocation routing by operation name.
//!
//! The ledger runtime delivers an invocation as a function name plus
//! positional string arguments. [`Operation::parse`] turns that pair into a
//! typed operation, and [`Dispatcher`] runs it against a [`RecordService`]
//! inside a span carrying a fresh [`TxId`].

use tracing::{error, info, info_span, warn};

use crate::codec::encode_text;
use crate::domain::LedgerError;
use crate::ports::LedgerStore;
use crate::service::RecordService;

mod tx_id;

pub use tx_id::TxId;

/// A parsed ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Register a car with no records.
    AddCar {
        /// Car key.
        car_id: String,
    },
    /// Read a car.
    GetCar {
        /// Car key.
        car_id: String,
    },
    /// Append a service record to a car.
    AddCarRecord {
        /// Car key.
        car_id: String,
        /// Free-form record text.
        record: String,
    },
    /// Create a user with a zero balance.
    CreateUser {
        /// User key.
        user_id: String,
        /// Display name.
        name: String,
    },
    /// Read a user.
    GetUser {
        /// User key.
        user_id: String,
    },
    /// Credit points to a user.
    ReceivePoints {
        /// User key.
        user_id: String,
        /// Points to credit.
        points: i64,
    },
    /// Debit points from a user.
    PayPoints {
        /// User key.
        user_id: String,
        /// Points to debit.
        points: i64,
    },
}

impl Operation {
    /// Operation names accepted by [`Operation::parse`].
    pub const NAMES: [&'static str; 7] = [
        "AddCar",
        "GetCar",
        "AddCarRecord",
        "CreateUser",
        "GetUser",
        "ReceivePoints",
        "PayPoints",
    ];

    /// Parse a named invocation with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] for an unknown name, a wrong
    /// argument count, or points that are not a base-10 `i64`.
    ///
    /// # Examples
    /// ```
    /// use record_ledger::Operation;
    ///
    /// let op = Operation::parse("PayPoints", &["u1".to_owned(), "30".to_owned()])
    ///     .expect("valid invocation");
    /// assert_eq!(
    ///     op,
    ///     Operation::PayPoints { user_id: "u1".to_owned(), points: 30 }
    /// );
    /// assert!(Operation::parse("PayPoints", &["u1".to_owned()]).is_err());
    /// ```
    pub fn parse(name: &str, args: &[String]) -> Result<Self, LedgerError> {
        match name {
            "AddCar" => {
                let [car_id] = positional(name, args)?;
                Ok(Self::AddCar { car_id })
            }
            "GetCar" => {
                let [car_id] = positional(name, args)?;
                Ok(Self::GetCar { car_id })
            }
            "AddCarRecord" => {
                let [car_id, record] = positional(name, args)?;
                Ok(Self::AddCarRecord { car_id, record })
            }
            "CreateUser" => {
                let [user_id, user_name] = positional(name, args)?;
                Ok(Self::CreateUser {
                    user_id,
                    name: user_name,
                })
            }
            "GetUser" => {
                let [user_id] = positional(name, args)?;
                Ok(Self::GetUser { user_id })
            }
            "ReceivePoints" => {
                let [user_id, raw] = positional(name, args)?;
                let points = parse_points(&raw)?;
                Ok(Self::ReceivePoints { user_id, points })
            }
            "PayPoints" => {
                let [user_id, raw] = positional(name, args)?;
                let points = parse_points(&raw)?;
                Ok(Self::PayPoints { user_id, points })
            }
            other => Err(LedgerError::invalid_request(format!(
                "unknown operation '{other}', expected one of {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// Invocation name of the operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddCar { .. } => "AddCar",
            Self::GetCar { .. } => "GetCar",
            Self::AddCarRecord { .. } => "AddCarRecord",
            Self::CreateUser { .. } => "CreateUser",
            Self::GetUser { .. } => "GetUser",
            Self::ReceivePoints { .. } => "ReceivePoints",
            Self::PayPoints { .. } => "PayPoints",
        }
    }

    /// The single ledger key the operation touches.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::AddCar { car_id }
            | Self::GetCar { car_id }
            | Self::AddCarRecord { car_id, .. } => car_id,
            Self::CreateUser { user_id, .. }
            | Self::GetUser { user_id }
            | Self::ReceivePoints { user_id, .. }
            | Self::PayPoints { user_id, .. } => user_id,
        }
    }

    /// Whether the operation writes to the ledger.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !matches!(self, Self::GetCar { .. } | Self::GetUser { .. })
    }
}

fn positional<const N: usize>(name: &str, args: &[String]) -> Result<[String; N], LedgerError> {
    <[String; N]>::try_from(args.to_vec()).map_err(|given| {
        LedgerError::invalid_request(format!(
            "{name} expects {N} argument(s), got {}",
            given.len()
        ))
    })
}

fn parse_points(raw: &str) -> Result<i64, LedgerError> {
    raw.parse().map_err(|err| {
        LedgerError::invalid_request(format!("points must be an integer, got '{raw}': {err}"))
    })
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    tx_id: TxId,
    payload: Option<String>,
}

impl InvocationResponse {
    /// Transaction identifier the invocation ran under.
    #[must_use]
    pub const fn tx_id(&self) -> TxId {
        self.tx_id
    }

    /// JSON of the entity for reads; `None` for writes.
    ///
    /// The payload is the decoded entity encoded again, not the bytes held in
    /// the store. Whitespace and field order are canonical, so a value written
    /// by another client as `{ "balance": 20, "name": "Alice" }` is returned
    /// as `{"name":"Alice","balance":20}`.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

/// Routes invocations to a [`RecordService`].
pub struct Dispatcher<S> {
    service: RecordService<S>,
}

impl<S> Dispatcher<S>
where
    S: LedgerStore,
{
    /// Wrap `service`.
    #[must_use]
    pub const fn new(service: RecordService<S>) -> Self {
        Self { service }
    }

    /// The wrapped service.
    #[must_use]
    pub const fn service(&self) -> &RecordService<S> {
        &self.service
    }

    /// Parse and run a named invocation under a fresh transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] when the invocation cannot be
    /// parsed, or the error raised by the operation.
    pub fn invoke(&self, name: &str, args: &[String]) -> Result<InvocationResponse, LedgerError> {
        let op = Operation::parse(name, args).inspect_err(|err| {
            warn!(operation = name, error = %err, "invocation rejected");
        })?;
        self.dispatch(&op)
    }

    /// Run `op` under a fresh transaction id.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the operation.
    pub fn dispatch(&self, op: &Operation) -> Result<InvocationResponse, LedgerError> {
        self.dispatch_as(TxId::generate(), op)
    }

    /// Run `op` under the caller-supplied transaction id.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the operation.
    pub fn dispatch_as(&self, tx_id: TxId, op: &Operation) -> Result<InvocationResponse, LedgerError> {
        let span = info_span!(
            "invocation",
            tx_id = %tx_id,
            operation = op.name(),
            key = op.key()
        );
        let _entered = span.enter();

        match self.execute(op) {
            Ok(payload) => {
                info!(write = op.is_write(), "invocation completed");
                Ok(InvocationResponse { tx_id, payload })
            }
            Err(err) => {
                record_failure(&err);
                Err(err)
            }
        }
    }

    fn execute(&self, op: &Operation) -> Result<Option<String>, LedgerError> {
        let service = &self.service;
        match op {
            Operation::AddCar { car_id } => service.add_car(car_id).map(|()| None),
            Operation::GetCar { car_id } => {
                let car = service.get_car(car_id)?;
                encode_text(&car)
                    .map(Some)
                    .map_err(|err| LedgerError::codec(car_id.as_str(), err))
            }
            Operation::AddCarRecord { car_id, record } => {
                service.add_car_record(car_id, record).map(|()| None)
            }
            Operation::CreateUser { user_id, name } => {
                service.create_user(user_id, name).map(|()| None)
            }
            Operation::GetUser { user_id } => {
                let user = service.get_user(user_id)?;
                encode_text(&user)
                    .map(Some)
                    .map_err(|err| LedgerError::codec(user_id.as_str(), err))
            }
            Operation::ReceivePoints { user_id, points } => {
                service.receive_points(user_id, *points).map(|()| None)
            }
            Operation::PayPoints { user_id, points } => {
                service.pay_points(user_id, *points).map(|()| None)
            }
        }
    }
}

fn record_failure(err: &LedgerError) {
    if err.is_fatal() {
        error!(code = ?err.code(), error = %err, "invocation failed");
    } else {
        warn!(code = ?err.code(), error = %err, "invocation rejected");
    }
}

#[cfg(test)]
mod tests;
