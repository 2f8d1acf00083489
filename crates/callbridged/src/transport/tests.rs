//! Unit tests for the stream and file-exchange bindings.

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::*;
use crate::catalog;
use crate::dispatch::Dispatcher;
use crate::registry::RegistryBuilder;
use crate::supervisor::ShutdownFlag;

#[fixture]
fn dispatcher() -> Dispatcher {
    let mut builder = RegistryBuilder::new();
    catalog::math::register(&mut builder).expect("register math");
    Dispatcher::new(builder.seal())
}

fn serve_stream(dispatcher: &Dispatcher, input: &str, max_frame_bytes: usize) -> Vec<Value> {
    let mut transport = StreamTransport::new(feed(input, max_frame_bytes), Vec::new());
    let exit = transport
        .serve(dispatcher, &ShutdownFlag::new())
        .expect("serve");
    assert_eq!(exit, TransportExit::ChannelClosed);
    lines_of(transport.into_writer())
}

fn feed(input: &str, max_frame_bytes: usize) -> Arc<FrameFeed> {
    FrameFeed::spawn(Cursor::new(input.as_bytes().to_vec()), max_frame_bytes).expect("feed")
}

fn lines_of(output: Vec<u8>) -> Vec<Value> {
    String::from_utf8(output)
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line is JSON"))
        .collect()
}

/// Writer whose host has gone away.
struct Closed;

impl Write for Closed {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader that never yields data.
struct Silent;

impl Read for Silent {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        thread::sleep(Duration::from_secs(3600));
        Ok(0)
    }
}

// ----------------------------------------------------------------------------
// Stream binding
// ----------------------------------------------------------------------------

#[rstest]
fn answers_each_frame_in_order(dispatcher: Dispatcher) {
    let input = concat!(
        r#"{"jsonrpc":"2.0","method":"add","params":{"a":2},"id":1}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"add","params":[2,3],"id":2}"#,
        "\n",
    );
    let responses = serve_stream(&dispatcher, input, 1024);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"], json!(2));
    assert_eq!(responses[0]["id"], json!(1));
    assert_eq!(responses[1]["result"], json!(5));
    assert_eq!(responses[1]["id"], json!(2));
}

#[rstest]
fn channel_survives_bad_frames(dispatcher: Dispatcher) {
    let input = concat!(
        "this is not json\n",
        "\n",
        r#"{"jsonrpc":"2.0","method":"factorial","params":{"n":-1},"id":"neg"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"factorial","params":{"n":5},"id":"ok"}"#,
        "\n",
    );
    let responses = serve_stream(&dispatcher, input, 1024);

    assert_eq!(responses.len(), 3, "blank line produces no frame");
    assert_eq!(responses[0]["error"]["code"], json!(-32700));
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["error"]["code"], json!(-32603));
    assert_eq!(responses[1]["id"], json!("neg"));
    assert_eq!(responses[2]["result"], json!(120));
}

#[rstest]
fn oversized_frames_are_rejected_and_skipped(dispatcher: Dispatcher) {
    let big = format!(
        r#"{{"jsonrpc":"2.0","method":"add","params":{{"a":1,"pad":"{}"}},"id":1}}"#,
        "x".repeat(256)
    );
    let input = format!(
        "{big}\n{}\n",
        r#"{"jsonrpc":"2.0","method":"add","params":[1,1],"id":2}"#
    );
    let responses = serve_stream(&dispatcher, &input, 128);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], json!(-32600));
    assert_eq!(responses[1]["result"], json!(2));
}

#[rstest]
fn unterminated_final_frame_is_answered(dispatcher: Dispatcher) {
    let responses = serve_stream(
        &dispatcher,
        r#"{"jsonrpc":"2.0","method":"list_functions","id":9}"#,
        1024,
    );
    assert_eq!(responses.len(), 1);
    assert!(responses[0]["result"].get("factorial").is_some());
}

#[rstest]
fn stream_returns_on_shutdown(dispatcher: Dispatcher) {
    let shutdown = ShutdownFlag::new();
    let raiser = {
        let flag = shutdown.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            flag.raise();
        })
    };
    let silent = FrameFeed::spawn(Silent, 1024).expect("feed");
    let mut transport = StreamTransport::new(silent, Vec::new());

    let exit = transport.serve(&dispatcher, &shutdown).expect("serve");

    assert_eq!(exit, TransportExit::Shutdown);
    raiser.join().expect("join raiser");
}

#[rstest]
fn buffered_frames_survive_a_transport_restart(dispatcher: Dispatcher) {
    let input = concat!(
        r#"{"jsonrpc":"2.0","method":"add","params":[1,1],"id":1}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"add","params":[2,2],"id":2}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"add","params":[3,3],"id":3}"#,
        "\n",
    );
    let shared = feed(input, 1024);

    let mut broken = StreamTransport::new(Arc::clone(&shared), Closed);
    let error = broken
        .serve(&dispatcher, &ShutdownFlag::new())
        .expect_err("write fails");
    assert!(matches!(error, TransportError::Write { .. }));

    let mut restarted = StreamTransport::new(shared, Vec::new());
    let exit = restarted
        .serve(&dispatcher, &ShutdownFlag::new())
        .expect("serve");
    assert_eq!(exit, TransportExit::ChannelClosed);
    let responses = lines_of(restarted.into_writer());
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], json!(2));
    assert_eq!(responses[0]["result"], json!(4));
    assert_eq!(responses[1]["result"], json!(6));
}

#[rstest]
fn closed_feed_stays_closed(dispatcher: Dispatcher) {
    let shared = feed("", 1024);
    for _ in 0..2 {
        let mut transport = StreamTransport::new(Arc::clone(&shared), Vec::new());
        let exit = transport
            .serve(&dispatcher, &ShutdownFlag::new())
            .expect("serve");
        assert_eq!(exit, TransportExit::ChannelClosed);
    }
}

// ----------------------------------------------------------------------------
// File-exchange binding
// ----------------------------------------------------------------------------

struct Exchange {
    _dir: TempDir,
    transport: FileExchangeTransport,
}

#[fixture]
fn exchange() -> Exchange {
    let dir = TempDir::new().expect("temp dir");
    let transport = FileExchangeTransport::new(
        dir.path().join("request.json"),
        dir.path().join("response.json"),
        Duration::from_millis(10),
    );
    Exchange {
        _dir: dir,
        transport,
    }
}

fn read_response(transport: &FileExchangeTransport) -> Value {
    let raw = fs::read(transport.response_path()).expect("response artefact");
    serde_json::from_slice(&raw).expect("response is JSON")
}

#[rstest]
fn answers_a_request_artefact(exchange: Exchange, dispatcher: Dispatcher) {
    let transport = &exchange.transport;
    fs::write(
        transport.request_path(),
        br#"{"function":"add","args":[2,3],"request_id":"r-1"}"#,
    )
    .expect("write request");

    let outcome = transport.poll_once(&dispatcher).expect("poll");

    assert_eq!(outcome, PollOutcome::Answered);
    let response = read_response(transport);
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["result"], json!(5));
    assert_eq!(response["request_id"], json!("r-1"));
    assert!(!transport.request_path().exists());
}

#[rstest]
fn named_args_are_supported(exchange: Exchange, dispatcher: Dispatcher) {
    let transport = &exchange.transport;
    fs::write(
        transport.request_path(),
        br#"{"function":"power_calculation","args":{"base":3},"request_id":7}"#,
    )
    .expect("write request");

    transport.poll_once(&dispatcher).expect("poll");

    assert_eq!(read_response(transport)["result"].as_f64(), Some(9.0));
}

#[rstest]
#[case::unknown_function(r#"{"function":"nope","args":[],"request_id":1}"#, "Method not found")]
#[case::target_error(r#"{"function":"factorial","args":[-3],"request_id":1}"#, "negative")]
#[case::bad_args(r#"{"function":"add","args":"oops","request_id":1}"#, "args must be")]
fn failures_are_reported_with_success_false(
    exchange: Exchange,
    dispatcher: Dispatcher,
    #[case] request: &str,
    #[case] needle: &str,
) {
    let transport = &exchange.transport;
    fs::write(transport.request_path(), request).expect("write request");

    transport.poll_once(&dispatcher).expect("poll");

    let response = read_response(transport);
    assert_eq!(response["success"], json!(false));
    let message = response["result"].as_str().expect("message");
    assert!(message.contains(needle), "message: {message}");
}

#[rstest]
fn corrupt_artefacts_are_discarded(exchange: Exchange, dispatcher: Dispatcher) {
    let transport = &exchange.transport;
    fs::write(transport.request_path(), b"{\"function\":").expect("write request");

    let outcome = transport.poll_once(&dispatcher).expect("poll");

    assert_eq!(outcome, PollOutcome::Discarded);
    assert!(!transport.request_path().exists());
    assert!(!transport.response_path().exists());
}

#[rstest]
#[case::missing_function(r#"{"args":[1],"request_id":"r-9"}"#, json!("r-9"), "missing 'function'")]
#[case::numeric_function(r#"{"function":5,"request_id":4}"#, json!(4), "must be a string")]
#[case::not_an_object("[1, 2]", Value::Null, "JSON object")]
fn malformed_requests_are_answered_with_success_false(
    exchange: Exchange,
    dispatcher: Dispatcher,
    #[case] request: &str,
    #[case] request_id: Value,
    #[case] needle: &str,
) {
    let transport = &exchange.transport;
    fs::write(transport.request_path(), request).expect("write request");

    let outcome = transport.poll_once(&dispatcher).expect("poll");

    assert_eq!(outcome, PollOutcome::Answered);
    let response = read_response(transport);
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["request_id"], request_id);
    let message = response["result"].as_str().expect("message");
    assert!(message.contains(needle), "message: {message}");
    assert!(!transport.request_path().exists());
}

#[rstest]
#[case::missing(None)]
#[case::empty(Some(""))]
fn idle_when_no_request_is_ready(
    exchange: Exchange,
    dispatcher: Dispatcher,
    #[case] contents: Option<&str>,
) {
    let transport = &exchange.transport;
    if let Some(contents) = contents {
        fs::write(transport.request_path(), contents).expect("write request");
    }
    assert_eq!(
        transport.poll_once(&dispatcher).expect("poll"),
        PollOutcome::Idle
    );
}

#[rstest]
fn temporary_artefacts_are_ignored(exchange: Exchange, dispatcher: Dispatcher) {
    let transport = &exchange.transport;
    let staged = transport.request_path().with_extension("json.tmp");
    fs::write(&staged, br#"{"function":"add","args":[1]}"#).expect("write staged");

    assert_eq!(
        transport.poll_once(&dispatcher).expect("poll"),
        PollOutcome::Idle
    );
    assert!(staged.exists());
}

#[rstest]
fn exchange_returns_on_shutdown(exchange: Exchange, dispatcher: Dispatcher) {
    let Exchange {
        _dir,
        mut transport,
    } = exchange;
    let shutdown = ShutdownFlag::new();
    shutdown.raise();

    let exit = transport.serve(&dispatcher, &shutdown).expect("serve");

    assert_eq!(exit, TransportExit::Shutdown);
}
