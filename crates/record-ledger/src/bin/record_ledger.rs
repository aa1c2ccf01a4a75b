//! `record-ledger` binary: run one ledger operation against a ledger file.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use record_ledger::cli::{Cli, CliError, load_settings, run, success_message};

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

fn report(err: &CliError) -> ExitCode {
    // Nothing else can be reported if stderr itself is gone.
    let _ignored = writeln!(io::stderr().lock(), "record-ledger: {err}");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => return report(&err),
    };
    init_tracing(settings.log_json);

    match run(cli, &settings) {
        Ok(response) => {
            if let Err(err) = writeln!(io::stdout().lock(), "{}", success_message(&response)) {
                warn!(error = %err, "failed to write result");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => report(&err),
    }
}
