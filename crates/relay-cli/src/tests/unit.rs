use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use relay_config::{Config, TcpEndpoint};
use relay_protocol::OutboundRequest;
use relayd::{RelayLink, SendError, TransmissionSink};
use rstest::rstest;

use crate::cli::{RequestCommand, TimeAction};
use crate::command::{Outbound, parse_local_time};
use crate::{AppError, ConfigLoader, IoStreams, LinkFactory, run_with};

struct StaticLoader(Config);

impl ConfigLoader for StaticLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    requests: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl TransmissionSink for RecordingSink {
    fn send(&self, request: &OutboundRequest) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::ShortWrite {
                written: 0,
                expected: request.len(),
            });
        }
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.as_str().to_owned());
        Ok(())
    }
}

impl LinkFactory for RecordingSink {
    fn link(&self, _config: &Config) -> RelayLink {
        RelayLink::new(Arc::new(self.clone()))
    }
}

fn build_request(command: &RequestCommand) -> Result<OutboundRequest, AppError> {
    Outbound::try_from(command).map(|outbound| outbound.request())
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str], sink: &RecordingSink) -> Outcome {
    let mut config = Config::default();
    config.controller_endpoint = TcpEndpoint::new("127.0.0.1", 5267);
    let loader = StaticLoader(config);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        let argv = std::iter::once("relay").chain(args.iter().copied());
        run_with(argv.map(OsString::from), &mut io, &loader, sink)
    };
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[rstest]
#[case::time_get(RequestCommand::Time { action: TimeAction::Get }, "CR:GET")]
#[case::status(RequestCommand::Status, "ST")]
#[case::send_single(RequestCommand::Send { tokens: vec![String::from("ST")] }, "ST")]
#[case::send_many(
    RequestCommand::Send { tokens: vec![String::from("TS"), String::from("ON")] },
    "TS:ON"
)]
#[case::time_set(
    RequestCommand::Time {
        action: TimeAction::Set { at: Some(String::from("2025-09-20 07:30:05")) },
    },
    "CR:SET:5:30:7:6:20:9:25"
)]
fn builds_wire_requests(#[case] command: RequestCommand, #[case] expected: &str) {
    let request = build_request(&command).expect("request");
    assert_eq!(request.as_str(), expected);
}

#[test]
fn time_set_without_timestamp_uses_current_clock() {
    let request = build_request(&RequestCommand::Time {
        action: TimeAction::Set { at: None },
    })
    .expect("request");
    let tokens: Vec<&str> = request.as_str().split(':').collect();
    assert_eq!(tokens.get(..2), Some(&["CR", "SET"][..]));
    assert_eq!(tokens.len(), 9);
}

#[rstest]
#[case::garbage("yesterday")]
#[case::missing_seconds("2025-01-02 03:04")]
#[case::impossible_date("2025-02-30 00:00:00")]
fn rejects_unparseable_time(#[case] input: &str) {
    let error = parse_local_time(input).expect_err("should reject");
    assert!(matches!(error, AppError::InvalidTime { .. }));
}

#[test]
fn time_set_outside_controller_years_is_rejected() {
    let error = build_request(&RequestCommand::Time {
        action: TimeAction::Set {
            at: Some(String::from("1999-12-31 23:59:59")),
        },
    })
    .expect_err("year 1999 cannot be encoded");
    assert!(error.to_string().contains("1999"), "unexpected: {error}");
}

#[test]
fn dry_run_prints_request_without_sending() {
    let sink = RecordingSink::default();
    let outcome = invoke(&["--dry-run", "send", "TS", "OFF"], &sink);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "TS:OFF\n");
    assert!(sink.requests().is_empty());
}

#[test]
fn sends_request_through_sink() {
    let sink = RecordingSink::default();
    let outcome = invoke(&["time", "get"], &sink);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(sink.requests(), vec![String::from("CR:GET")]);
    assert_eq!(outcome.stdout, "sent CR:GET to tcp://127.0.0.1:5267\n");
}

#[rstest]
#[case::time_get(&["time", "get"], "CR:GET")]
#[case::time_set(&["time", "set", "--at", "2025-01-02 03:04:05"], "CR:SET:5:4:3:4:2:1:25")]
#[case::status(&["status"], "ST")]
#[case::raw(&["send", "PO", "ON"], "PO:ON")]
fn every_request_is_delivered_through_the_link(#[case] args: &[&str], #[case] wire: &str) {
    let sink = RecordingSink::default();
    let outcome = invoke(args, &sink);
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert_eq!(sink.requests(), vec![wire.to_owned()]);
}

#[test]
fn send_failure_is_reported_on_stderr() {
    let sink = RecordingSink::failing();
    let outcome = invoke(&["status"], &sink);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("short write"), "{}", outcome.stderr);
}

#[test]
fn decode_describes_time_report() {
    let sink = RecordingSink::default();
    let outcome = invoke(&["decode", "CR:GET:5:30:7:6:20:9:25"], &sink);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("kind: time_request"));
    assert!(outcome.stdout.contains("operation: GET"));
    assert!(
        outcome
            .stdout
            .contains("report: 2025-09-20 07:30:05 (weekday 6)")
    );
    assert!(sink.requests().is_empty());
}

#[rstest]
#[case::acknowledged("TS:ACK", "acknowledged: true")]
#[case::refused("TS:NACK", "acknowledged: false")]
#[case::unknown("ZZ:FOO", "kind: unknown")]
fn decode_describes_generic_commands(#[case] text: &str, #[case] expected: &str) {
    let outcome = invoke(&["decode", text], &RecordingSink::default());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains(expected), "{}", outcome.stdout);
}

#[test]
fn decode_rejects_unknown_time_operation() {
    let outcome = invoke(&["decode", "CR:FOO"], &RecordingSink::default());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome
            .stderr
            .contains("unrecognized time operation 'FOO'")
    );
}

#[test]
fn help_is_printed_to_stdout() {
    let outcome = invoke(&["--help"], &RecordingSink::default());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("Usage"));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn missing_command_is_a_usage_error() {
    let outcome = invoke(&[], &RecordingSink::default());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert!(!outcome.stderr.is_empty());
}
