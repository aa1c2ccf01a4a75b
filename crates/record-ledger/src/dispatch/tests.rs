//! Tests for invocation parsing and dispatch.

use std::sync::Arc;

use insta::assert_json_snapshot;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::{Car, ErrorCode};
use crate::outbound::MemoryLedger;
use crate::ports::MockLedgerStore;
use crate::service::LedgerOptions;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[fixture]
fn dispatcher() -> Dispatcher<MemoryLedger> {
    Dispatcher::new(RecordService::new(
        Arc::new(MemoryLedger::new()),
        LedgerOptions::default(),
    ))
}

#[rstest]
#[case::add_car("AddCar", &["car1"], Operation::AddCar { car_id: "car1".to_owned() })]
#[case::add_record(
    "AddCarRecord",
    &["car1", "oil change"],
    Operation::AddCarRecord { car_id: "car1".to_owned(), record: "oil change".to_owned() }
)]
#[case::create_user(
    "CreateUser",
    &["u1", "Alice"],
    Operation::CreateUser { user_id: "u1".to_owned(), name: "Alice".to_owned() }
)]
#[case::receive(
    "ReceivePoints",
    &["u1", "-7"],
    Operation::ReceivePoints { user_id: "u1".to_owned(), points: -7 }
)]
#[case::pay("PayPoints", &["u1", "+30"], Operation::PayPoints { user_id: "u1".to_owned(), points: 30 })]
fn parses_named_invocations(
    #[case] name: &str,
    #[case] raw: &[&str],
    #[case] expected: Operation,
) {
    let op = Operation::parse(name, &args(raw)).expect("valid invocation");

    assert_eq!(op, expected);
    assert_eq!(op.name(), name);
}

#[rstest]
#[case::unknown("DeleteUser", &["u1"])]
#[case::lowercase("getUser", &["u1"])]
#[case::too_few("AddCarRecord", &["car1"])]
#[case::too_many("GetCar", &["car1", "extra"])]
#[case::none("CreateUser", &[])]
#[case::not_a_number("ReceivePoints", &["u1", "ten"])]
#[case::fractional("PayPoints", &["u1", "1.5"])]
#[case::out_of_range("ReceivePoints", &["u1", "9223372036854775808"])]
fn malformed_invocations_are_invalid_requests(#[case] name: &str, #[case] raw: &[&str]) {
    let err = Operation::parse(name, &args(raw)).expect_err("malformed invocation");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(!err.is_fatal());
}

#[test]
fn argument_count_errors_name_the_operation() {
    let err = Operation::parse("AddCarRecord", &args(&["car1"])).expect_err("one argument short");

    assert_eq!(
        err.to_string(),
        "invalid request: AddCarRecord expects 2 argument(s), got 1"
    );
}

#[rstest]
#[case::car(Operation::AddCarRecord { car_id: "car1".to_owned(), record: "r".to_owned() }, "car1", true)]
#[case::user(Operation::GetUser { user_id: "u1".to_owned() }, "u1", false)]
fn operations_expose_key_and_write_flag(
    #[case] op: Operation,
    #[case] key: &str,
    #[case] write: bool,
) {
    assert_eq!(op.key(), key);
    assert_eq!(op.is_write(), write);
}

#[test]
fn invalid_requests_never_touch_the_store() {
    let mut store = MockLedgerStore::new();
    store.expect_get().times(0);
    store.expect_put().times(0);
    let dispatcher = Dispatcher::new(RecordService::new(
        Arc::new(store),
        LedgerOptions::default(),
    ));

    let err = dispatcher
        .invoke("PayPoints", &args(&["u1", "lots"]))
        .expect_err("bad points");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn writes_return_no_payload(dispatcher: Dispatcher<MemoryLedger>) {
    let response = dispatcher
        .invoke("CreateUser", &args(&["u1", "Alice"]))
        .expect("create user");

    assert_eq!(response.payload(), None);
}

#[rstest]
fn reads_return_canonical_json(dispatcher: Dispatcher<MemoryLedger>) {
    dispatcher.invoke("AddCar", &args(&["car1"])).expect("add car");
    dispatcher
        .invoke("AddCarRecord", &args(&["car1", "oil change"]))
        .expect("add record");

    let response = dispatcher.invoke("GetCar", &args(&["car1"])).expect("get car");

    assert_eq!(
        response.payload(),
        Some(r#"{"carId":"car1","records":["oil change"]}"#)
    );
}

#[test]
fn read_payloads_are_re_encoded_not_the_stored_text() {
    let store = Arc::new(MemoryLedger::new());
    store
        .put("u1", br#"{ "balance": 20, "name": "Alice" }"#.to_vec())
        .expect("seed user");
    let dispatcher = Dispatcher::new(RecordService::new(
        Arc::clone(&store),
        LedgerOptions::default(),
    ));

    let response = dispatcher.invoke("GetUser", &args(&["u1"])).expect("get user");

    assert_eq!(response.payload(), Some(r#"{"name":"Alice","balance":20}"#));
    assert_eq!(
        store.get("u1").expect("get"),
        Some(br#"{ "balance": 20, "name": "Alice" }"#.to_vec())
    );
}

#[rstest]
fn read_payloads_decode_back_to_the_entity(dispatcher: Dispatcher<MemoryLedger>) {
    dispatcher.invoke("AddCar", &args(&["car1"])).expect("add car");
    dispatcher
        .invoke("AddCarRecord", &args(&["car1", "tire rotation"]))
        .expect("add record");

    let response = dispatcher.invoke("GetCar", &args(&["car1"])).expect("get car");
    let car: Car = serde_json::from_str(response.payload().expect("read payload"))
        .expect("payload is a car");

    assert_json_snapshot!(car, @r#"
    {
      "carId": "car1",
      "records": [
        "tire rotation"
      ]
    }
    "#);
}

#[rstest]
fn caller_supplied_transaction_ids_are_echoed(dispatcher: Dispatcher<MemoryLedger>) {
    let tx_id = TxId::from_uuid(Uuid::nil());
    let op = Operation::ReceivePoints {
        user_id: "u1".to_owned(),
        points: 15,
    };

    let response = dispatcher.dispatch_as(tx_id, &op).expect("receive points");

    assert_eq!(response.tx_id(), tx_id);
}

#[rstest]
fn each_invocation_gets_a_fresh_transaction_id(dispatcher: Dispatcher<MemoryLedger>) {
    let first = dispatcher
        .invoke("ReceivePoints", &args(&["u1", "1"]))
        .expect("first");
    let second = dispatcher
        .invoke("ReceivePoints", &args(&["u1", "1"]))
        .expect("second");

    assert_ne!(first.tx_id(), second.tx_id());
}

#[rstest]
fn operation_errors_pass_through_unchanged(dispatcher: Dispatcher<MemoryLedger>) {
    dispatcher
        .invoke("ReceivePoints", &args(&["u1", "20"]))
        .expect("receive");

    let err = dispatcher
        .invoke("PayPoints", &args(&["u1", "25"]))
        .expect_err("insufficient");

    assert_eq!(
        err,
        LedgerError::InsufficientBalance {
            key: "u1".to_owned(),
            balance: 20,
            requested: 25,
        }
    );
    let user = dispatcher.service().get_user("u1").expect("user");
    assert_eq!(user.balance(), 20);
}
