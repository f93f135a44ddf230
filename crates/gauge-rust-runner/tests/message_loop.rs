//! End-to-end runs of the message loop over in-memory frames

use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex};

use gauge_rust_runner::config::RunnerConfig;
use gauge_rust_runner::message_loop::{self, LoopExit};
use gauge_rust_runner::registry::HookRegistry;
use gauge_rust_runner::transport::{IoTransport, Transport};
use gauge_rust_runner::{ProtocolError, Runner};
use gauge_rust_sdk::context::ScenarioInfo;
use gauge_rust_sdk::ipc;
use gauge_rust_sdk::message::*;
use gauge_rust_sdk::{ExecutionInfo, ExecutionResult, HookError, HookHandle, Message, MessageType, Payload};

fn config() -> RunnerConfig {
    RunnerConfig {
        project_root: ".".into(),
        host: "127.0.0.1".into(),
        internal_port: None,
        connect_timeout_secs: 0,
        screenshot_on_failure: false,
    }
}

fn frames(messages: &[Message]) -> Vec<u8> {
    let mut wire = Vec::new();
    for message in messages {
        ipc::write_message(&mut wire, message).unwrap();
    }
    wire
}

fn responses(written: Vec<u8>) -> Vec<Message> {
    let mut reader = Cursor::new(written);
    let mut out = Vec::new();
    while let Some(message) = ipc::read_message(&mut reader).unwrap() {
        out.push(message);
    }
    out
}

fn result_of(message: &Message) -> &ExecutionResult {
    match &message.payload {
        Payload::ExecutionStatusResponse(status) => &status.execution_result,
        other => panic!("unexpected payload {}", other.name()),
    }
}

fn execution_ending(id: i64) -> Message {
    Message::new(id, MessageType::ExecutionEnding, Payload::ExecutionEndingRequest(Default::default()))
}

fn kill(id: i64) -> Message {
    Message::new(id, MessageType::KillProcessRequest, Payload::KillProcessRequest(KillProcessRequest {}))
}

fn run(runner: &Runner, requests: &[Message]) -> (Result<LoopExit, ProtocolError>, Vec<Message>) {
    let mut transport = IoTransport::new(Cursor::new(frames(requests)), Vec::new());
    let exit = message_loop::run(&mut transport, &runner.dispatcher());
    assert!(!transport.is_connected());
    (exit, responses(transport.into_writer()))
}

#[test]
fn execution_ending_runs_after_suite_hook() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let hooks = HookRegistry::builder()
        .after_suite(HookHandle::new("foo", move |_info: &ExecutionInfo| {
            *counter.lock().unwrap() += 1;
            Ok(())
        }))
        .build();
    let runner = Runner::new(config()).with_hooks(hooks);

    let (exit, sent) = run(&runner, &[execution_ending(20)]);

    assert_eq!(exit.unwrap(), LoopExit::HostClosed);
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_id, 20);
    assert_eq!(sent[0].message_type, MessageType::ExecutionStatusResponse);
    assert!(!result_of(&sent[0]).failed);
}

#[test]
fn failing_hook_is_reported_not_fatal() {
    let hooks = HookRegistry::builder()
        .before_scenario(HookHandle::new("check_tags", |info: &ExecutionInfo| {
            match info.scenario_name() {
                Some(name) => Err(HookError::Assertion(format!("{} is not ready", name))),
                None => Ok(()),
            }
        }))
        .build();
    let runner = Runner::new(config()).with_hooks(hooks);

    let starting = Message::new(
        4,
        MessageType::ScenarioExecutionStarting,
        Payload::ScenarioExecutionStartingRequest(ScenarioExecutionStartingRequest {
            current_execution_info: Some(ExecutionInfo {
                current_scenario: Some(ScenarioInfo { name: "Login".into(), ..Default::default() }),
                ..Default::default()
            }),
        }),
    );

    let (exit, sent) = run(&runner, &[starting, execution_ending(5)]);

    assert_eq!(exit.unwrap(), LoopExit::HostClosed);
    assert_eq!(sent.len(), 2);
    let failed = result_of(&sent[0]);
    assert!(failed.failed);
    assert_eq!(failed.error_message.as_deref(), Some("Assertion failed: Login is not ready"));
    assert!(!result_of(&sent[1]).failed);
}

#[test]
fn responses_follow_request_order() {
    let runner = Runner::new(config());
    let requests = [
        Message::new(1, MessageType::SuiteDataStoreInit, Payload::SuiteDataStoreInitRequest(DataStoreInitRequest {})),
        Message::new(2, MessageType::StepNamesRequest, Payload::StepNamesRequest(StepNamesRequest {})),
        execution_ending(3),
    ];

    let (_, sent) = run(&runner, &requests);

    let ids: Vec<i64> = sent.iter().map(|m| m.message_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(sent[1].message_type, MessageType::StepNamesResponse);
}

#[test]
fn kill_is_acknowledged_and_stops_the_loop() {
    let runner = Runner::new(config());

    let (exit, sent) = run(&runner, &[kill(7), execution_ending(8)]);

    assert_eq!(exit.unwrap(), LoopExit::Killed);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_id, 7);
    assert!(!result_of(&sent[0]).failed);
}

#[test]
fn empty_stream_closes_cleanly() {
    let (exit, sent) = run(&Runner::new(config()), &[]);
    assert_eq!(exit.unwrap(), LoopExit::HostClosed);
    assert!(sent.is_empty());
}

#[test]
fn unsupported_message_aborts_without_response() {
    let stray = Message::execution_status(9, ExecutionResult::passed(0));

    let (exit, sent) = run(&Runner::new(config()), &[stray, execution_ending(10)]);

    assert!(matches!(
        exit,
        Err(ProtocolError::UnsupportedMessageType(MessageType::ExecutionStatusResponse))
    ));
    assert!(sent.is_empty());
}

/// Serves the given bytes, then fails as if the peer reset the connection.
struct ResetAfter(Cursor<Vec<u8>>);

impl Read for ResetAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::ErrorKind::ConnectionReset.into()),
            n => Ok(n),
        }
    }
}

#[test]
fn connection_reset_ends_the_loop_cleanly() {
    let reader = ResetAfter(Cursor::new(frames(&[execution_ending(11)])));
    let mut transport = IoTransport::new(reader, Vec::new());

    let exit = message_loop::run(&mut transport, &Runner::new(config()).dispatcher());

    assert_eq!(exit.unwrap(), LoopExit::TransportClosed);
    assert!(!transport.is_connected());
    let sent = responses(transport.into_writer());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_id, 11);
}

#[test]
fn truncated_frame_ends_the_loop_cleanly() {
    let mut wire = frames(&[execution_ending(12)]);
    wire.extend_from_slice(&[0x09, 0x08]);

    let mut transport = IoTransport::new(Cursor::new(wire), Vec::new());
    let exit = message_loop::run(&mut transport, &Runner::new(config()).dispatcher());

    assert_eq!(exit.unwrap(), LoopExit::TransportClosed);
    assert_eq!(responses(transport.into_writer()).len(), 1);
}

#[test]
fn undecodable_frame_is_a_codec_fault() {
    let mut wire = Vec::new();
    ipc::write_frame(&mut wire, &[0x0A, 0x7F]).unwrap();
    let mut transport = IoTransport::new(Cursor::new(wire), Vec::new());

    let exit = message_loop::run(&mut transport, &Runner::new(config()).dispatcher());

    assert!(matches!(exit, Err(ProtocolError::Codec(_))));
}
