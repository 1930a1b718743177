use rlc_core::descriptors::{OperationDescriptor, build_operation_descriptor, build_operation_descriptors};
use rlc_core::error::RuntimeError;
use rlc_core::model::{self, HttpMethod};
use rlc_core::runtime::{
    Arguments, LroPoller, MockTransport, PagedItems, Response, call_operation,
};
use serde_json::{Value, json};

fn operation(yaml: &str) -> OperationDescriptor {
    let model = model::from_yaml(yaml).unwrap();
    let (path, meta, op) = model.operations().next().unwrap();
    build_operation_descriptor(path, meta.operation_group_name.as_deref(), op).unwrap()
}

fn args(pairs: &[(&str, Value)]) -> Arguments {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

const GET_USER: &str = r#"
paths:
  /users/{userId}:
    operations:
      - name: getUser
        method: GET
        response: { type: GetUserResponse, expectedStatuses: ["200"] }
        parameters:
          - { name: userId, type: string, location: path }
"#;

const LIST_USERS: &str = r#"
paths:
  /users:
    operations:
      - name: listUsers
        method: GET
        response: { type: UserList }
        paging: { itemField: value, nextLinkField: nextLink }
"#;

const CREATE_JOB: &str = r#"
paths:
  /jobs:
    operations:
      - name: createJob
        method: POST
        response: { type: JobStatus }
        parameters:
          - { name: body, type: JobRequest, location: body }
        lro: { finalResultType: JobResult, finalResultPath: ".result" }
"#;

#[test]
fn plain_operation_returns_parsed_body() {
    let op = operation(GET_USER);
    let mut transport = MockTransport::new([Response::new(200, json!({"id": "abc123"}))]);

    let result = call_operation(&op, &mut transport, &args(&[("userId", json!("abc123"))])).unwrap();

    assert_eq!(result, json!({"id": "abc123"}));
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, HttpMethod::Get);
    assert_eq!(sent.url, "/users/abc123");
}

#[test]
fn plain_operation_rejects_unexpected_status() {
    let op = operation(GET_USER);
    let mut transport = MockTransport::new([Response::new(500, json!({"error": "boom"}))]);

    let err = call_operation(&op, &mut transport, &args(&[("userId", json!("abc123"))])).unwrap_err();

    match err {
        RuntimeError::Rest(rest) => {
            assert_eq!(rest.status, 500);
            assert_eq!(rest.body, json!({"error": "boom"}));
        }
        other => panic!("expected RestError, got {other:?}"),
    }
}

#[test]
fn paging_operation_follows_next_links() {
    let op = operation(LIST_USERS);
    let mut transport = MockTransport::new([
        Response::new(200, json!({"value": [1, 2], "nextLink": "p2"})),
        Response::new(200, json!({"value": [3]})),
    ]);

    let items: Vec<Value> = PagedItems::new(&op, &mut transport, Arguments::new())
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(transport.requests()[1].url, "p2");
    assert_eq!(transport.remaining(), 0);
}

#[test]
fn paging_iterator_is_lazy() {
    let op = operation(LIST_USERS);
    let mut transport = MockTransport::new([
        Response::new(200, json!({"value": [1, 2], "nextLink": "p2"})),
        Response::new(200, json!({"value": [3]})),
    ]);

    let mut pages = PagedItems::new(&op, &mut transport, Arguments::new());
    assert_eq!(pages.next().unwrap().unwrap(), json!(1));
    assert_eq!(pages.pages(), 1);
    assert_eq!(pages.next().unwrap().unwrap(), json!(2));
    assert_eq!(pages.next().unwrap().unwrap(), json!(3));
    assert_eq!(pages.pages(), 2);
    assert!(pages.next().is_none());
}

#[test]
fn paging_page_without_items_is_an_error() {
    let op = operation(LIST_USERS);
    let mut transport = MockTransport::new([Response::new(200, json!({"items": []}))]);

    let err = call_operation(&op, &mut transport, &Arguments::new()).unwrap_err();
    assert!(matches!(err, RuntimeError::MissingPageItems(field) if field == "value"));
}

#[test]
fn lro_final_value_comes_from_result_path() {
    let op = operation(CREATE_JOB);
    let mut transport = MockTransport::new([
        Response::new(202, json!({"status": "running"}))
            .with_header("Operation-Location", "/jobs/1/status"),
        Response::new(202, json!({"status": "running"})),
        Response::new(200, json!({"result": {"status": "done"}})),
    ]);

    let poller = LroPoller::begin(&op, &mut transport, &args(&[("body", json!({"n": 1}))])).unwrap();
    assert!(!poller.is_done());
    let value = poller.poll_until_done().unwrap();

    assert_eq!(value, json!({"status": "done"}));
    let urls: Vec<&str> = transport.requests().iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["/jobs", "/jobs/1/status", "/jobs/1/status"]);
    assert_eq!(transport.requests()[0].body, Some(json!({"n": 1})));
}

#[test]
fn lro_completing_immediately() {
    let op = operation(CREATE_JOB);
    let mut transport =
        MockTransport::new([Response::new(200, json!({"result": {"status": "done"}}))]);

    let value = call_operation(&op, &mut transport, &args(&[("body", json!({}))])).unwrap();
    assert_eq!(value, json!({"status": "done"}));
}

#[test]
fn lro_without_polling_location_fails() {
    let op = operation(CREATE_JOB);
    let mut transport = MockTransport::new([Response::new(202, json!({}))]);

    let err = call_operation(&op, &mut transport, &args(&[("body", json!({}))])).unwrap_err();
    assert!(matches!(err, RuntimeError::MissingPollingLocation));
}

#[test]
fn fixture_operations_run_against_mock_transport() {
    let model = model::from_yaml(include_str!("fixtures/widgets.yaml")).unwrap();
    let ops = build_operation_descriptors(&model).unwrap();
    let ping = ops.iter().find(|op| op.name == "ping").unwrap();
    let mut transport = MockTransport::new([Response::new(200, json!({"ok": true}))]);

    call_operation(ping, &mut transport, &args(&[("apiVersion", json!("2024-01-01"))])).unwrap();

    assert_eq!(transport.requests()[0].url, "/health?apiVersion=2024-01-01");
}

#[test]
fn exhausted_transport_reports_request() {
    let op = operation(GET_USER);
    let mut transport = MockTransport::default();
    let err = call_operation(&op, &mut transport, &args(&[("userId", json!("x"))])).unwrap_err();
    assert!(matches!(err, RuntimeError::TransportExhausted { url, .. } if url == "/users/x"));
}
