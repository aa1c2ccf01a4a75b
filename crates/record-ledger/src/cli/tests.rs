//! Tests for command-line parsing and execution.

use rstest::{fixture, rstest};
use tempfile::TempDir;
use uuid::Uuid;

use super::*;
use crate::dispatch::TxId;
use crate::domain::ErrorCode;
use crate::outbound::MemoryLedger;
use crate::service::LedgerOptions;

struct Workspace {
    _dir: TempDir,
    path: PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ledger.json");
    Workspace { _dir: dir, path }
}

fn settings() -> LedgerSettings {
    LedgerSettings {
        ledger_path: None,
        reject_negative_points: false,
        guard_existing: false,
        log_json: false,
    }
}

fn parse(words: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("record-ledger").chain(words.iter().copied()))
        .expect("valid command line")
}

fn run_in(workspace: &Workspace, words: &[&str]) -> Result<InvocationResponse, CliError> {
    let mut cli = parse(words);
    cli.ledger = Some(workspace.path.clone());
    run(cli, &settings())
}

#[rstest]
#[case::add_car(&["add-car", "car1"], Command::AddCar { car_id: "car1".to_owned() })]
#[case::add_record(
    &["add-car-record", "car1", "oil change"],
    Command::AddCarRecord { car_id: "car1".to_owned(), record: "oil change".to_owned() }
)]
#[case::negative_points(
    &["pay-points", "u1", "-5"],
    Command::PayPoints { user_id: "u1".to_owned(), points: -5 }
)]
#[case::invoke(
    &["invoke", "ReceivePoints", "u1", "-5"],
    Command::Invoke { name: "ReceivePoints".to_owned(), args: vec!["u1".to_owned(), "-5".to_owned()] }
)]
fn parses_subcommands(#[case] words: &[&str], #[case] expected: Command) {
    assert_eq!(parse(words).command, expected);
}

#[test]
fn ledger_flag_is_accepted_after_the_subcommand() {
    let cli = parse(&["get-user", "u1", "--ledger", "/tmp/other.json"]);

    assert_eq!(cli.ledger, Some(PathBuf::from("/tmp/other.json")));
}

#[rstest]
#[case::missing_argument(&["create-user", "u1"])]
#[case::non_numeric_points(&["receive-points", "u1", "ten"])]
#[case::unknown_subcommand(&["delete-user", "u1"])]
fn rejects_malformed_command_lines(#[case] words: &[&str]) {
    let result = Cli::try_parse_from(std::iter::once("record-ledger").chain(words.iter().copied()));

    assert!(result.is_err());
}

#[rstest]
fn state_persists_between_runs(workspace: Workspace) {
    run_in(&workspace, &["create-user", "u1", "Alice"]).expect("create");
    run_in(&workspace, &["receive-points", "u1", "50"]).expect("receive");
    run_in(&workspace, &["invoke", "PayPoints", "u1", "30"]).expect("pay");

    let response = run_in(&workspace, &["get-user", "u1"]).expect("get");

    assert_eq!(response.payload(), Some(r#"{"name":"Alice","balance":20}"#));
}

#[rstest]
fn operation_failures_surface_as_ledger_errors(workspace: Workspace) {
    let err = run_in(&workspace, &["add-car-record", "missing", "x"]).expect_err("no car");

    match err {
        CliError::Ledger(inner) => assert_eq!(inner.code(), ErrorCode::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn invoke_reports_invalid_requests(workspace: Workspace) {
    let err = run_in(&workspace, &["invoke", "GetCar"]).expect_err("missing argument");

    assert_eq!(
        err.to_string(),
        "invalid request: GetCar expects 1 argument(s), got 0"
    );
}

#[rstest]
fn corrupt_ledger_files_fail_to_open(workspace: Workspace) {
    std::fs::write(&workspace.path, "garbage").expect("write file");

    let err = run_in(&workspace, &["get-user", "u1"]).expect_err("corrupt file");

    assert!(matches!(err, CliError::Open { .. }), "{err}");
}

#[rstest]
fn configured_policies_apply(workspace: Workspace) {
    let strict = LedgerSettings {
        reject_negative_points: true,
        ..settings()
    };
    let mut cli = parse(&["receive-points", "u1", "-5"]);
    cli.ledger = Some(workspace.path.clone());

    let err = run(cli, &strict).expect_err("negative points");

    match err {
        CliError::Ledger(inner) => assert_eq!(inner, LedgerError::InvalidPoints { points: -5 }),
        other => panic!("unexpected error: {other}"),
    }
}

fn memory_dispatcher() -> Dispatcher<MemoryLedger> {
    Dispatcher::new(RecordService::new(
        Arc::new(MemoryLedger::new()),
        LedgerOptions::default(),
    ))
}

#[test]
fn success_message_prints_tx_id_for_writes() {
    let tx_id = TxId::from_uuid(Uuid::nil());
    let op = Operation::AddCar {
        car_id: "car1".to_owned(),
    };

    let response = memory_dispatcher().dispatch_as(tx_id, &op).expect("add car");

    assert_eq!(
        success_message(&response),
        "committed 00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn success_message_prints_payload_for_reads() {
    let dispatcher = memory_dispatcher();
    dispatcher
        .invoke("AddCar", &["car1".to_owned()])
        .expect("add car");

    let response = dispatcher
        .invoke("GetCar", &["car1".to_owned()])
        .expect("get car");

    assert_eq!(
        success_message(&response),
        r#"{"carId":"car1","records":[]}"#
    );
}
