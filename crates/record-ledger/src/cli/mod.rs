//! Command-line surface of the `record-ledger` binary.
//!
//! Each subcommand maps onto one ledger operation and runs against a
//! [`FileLedger`]; `invoke` accepts the raw name-plus-arguments form the
//! ledger runtime uses.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use thiserror::Error;

use crate::config::LedgerSettings;
use crate::dispatch::{Dispatcher, InvocationResponse, Operation};
use crate::domain::LedgerError;
use crate::outbound::FileLedger;
use crate::ports::LedgerStoreError;
use crate::service::RecordService;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "record-ledger",
    version,
    about = "Maintain user point balances and car service histories in a ledger file"
)]
pub struct Cli {
    /// Ledger file to operate on. Overrides `RECORD_LEDGER_LEDGER_PATH`.
    #[arg(long, value_name = "PATH", global = true)]
    pub ledger: Option<PathBuf>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Register a car with an empty service history.
    AddCar {
        /// Car key.
        car_id: String,
    },
    /// Print a car as JSON.
    GetCar {
        /// Car key.
        car_id: String,
    },
    /// Append a service record to a car.
    AddCarRecord {
        /// Car key.
        car_id: String,
        /// Record text.
        record: String,
    },
    /// Create a user with a zero balance.
    CreateUser {
        /// User key.
        user_id: String,
        /// Display name.
        name: String,
    },
    /// Print a user as JSON.
    GetUser {
        /// User key.
        user_id: String,
    },
    /// Credit points to a user, creating it if absent.
    ReceivePoints {
        /// User key.
        user_id: String,
        /// Points to credit.
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },
    /// Debit points from a user.
    PayPoints {
        /// User key.
        user_id: String,
        /// Points to debit.
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },
    /// Run an operation by name with positional string arguments.
    Invoke {
        /// Operation name, for example `ReceivePoints`.
        name: String,
        /// Positional arguments passed to the operation.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Command {
    /// Resolve the subcommand to a ledger operation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] when an `invoke` name or its
    /// arguments do not parse.
    pub fn into_operation(self) -> Result<Operation, LedgerError> {
        Ok(match self {
            Self::AddCar { car_id } => Operation::AddCar { car_id },
            Self::GetCar { car_id } => Operation::GetCar { car_id },
            Self::AddCarRecord { car_id, record } => Operation::AddCarRecord { car_id, record },
            Self::CreateUser { user_id, name } => Operation::CreateUser { user_id, name },
            Self::GetUser { user_id } => Operation::GetUser { user_id },
            Self::ReceivePoints { user_id, points } => Operation::ReceivePoints { user_id, points },
            Self::PayPoints { user_id, points } => Operation::PayPoints { user_id, points },
            Self::Invoke { name, args } => return Operation::parse(&name, &args),
        })
    }
}

/// Failures surfaced by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded or are unusable.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
    /// The ledger file could not be opened.
    #[error("failed to open ledger {path}: {source}")]
    Open {
        /// Ledger file location.
        path: Utf8PathBuf,
        /// Adapter failure.
        #[source]
        source: LedgerStoreError,
    },
    /// The operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Load settings from the environment and configuration files.
///
/// # Errors
///
/// Returns [`CliError::Config`] when a configuration source is malformed.
pub fn load_settings() -> Result<LedgerSettings, CliError> {
    LedgerSettings::load_from_iter([OsString::from("record-ledger")]).map_err(|err| {
        CliError::Config {
            message: err.to_string(),
        }
    })
}

/// Open the configured ledger and run the parsed command against it.
///
/// # Errors
///
/// Returns [`CliError::Config`] for a non-UTF-8 ledger path,
/// [`CliError::Open`] when the ledger cannot be loaded, and
/// [`CliError::Ledger`] when the operation fails.
pub fn run(cli: Cli, settings: &LedgerSettings) -> Result<InvocationResponse, CliError> {
    let requested = cli.ledger.unwrap_or_else(|| settings.ledger_path());
    let path = Utf8PathBuf::from_path_buf(requested).map_err(|rejected| CliError::Config {
        message: format!("ledger path {} is not valid UTF-8", rejected.display()),
    })?;
    let ledger = FileLedger::open(&path).map_err(|source| CliError::Open {
        path: path.clone(),
        source,
    })?;
    let dispatcher = Dispatcher::new(RecordService::new(Arc::new(ledger), settings.options()));

    let response = match cli.command {
        Command::Invoke { name, args } => dispatcher.invoke(&name, &args)?,
        command => dispatcher.dispatch(&command.into_operation()?)?,
    };
    Ok(response)
}

/// Text printed on success: the entity JSON for reads, the transaction id
/// for writes.
#[must_use]
pub fn success_message(response: &InvocationResponse) -> String {
    response.payload().map_or_else(
        || format!("committed {}", response.tx_id()),
        str::to_owned,
    )
}

#[cfg(test)]
mod tests;
