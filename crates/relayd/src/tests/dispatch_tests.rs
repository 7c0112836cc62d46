//! Tests for the event bus and the outbound request point.

use std::net::TcpStream;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use mockall::predicate::function;
use rstest::{fixture, rstest};

use relay_config::TcpEndpoint;
use relay_protocol::{CodecError, CommandKind, OutboundRequest, TimeOperation, Timestamp};

use crate::sender::MockTransmissionSink;
use crate::{
    Channel, DataEvent, DispatchConnectionHandler, EventBus, ReadPolicy, RelayLink,
    RelayListener, SendError, TimeEvent,
};

#[derive(Default)]
struct Recorded {
    data: Mutex<Vec<DataEvent>>,
    time: Mutex<Vec<TimeEvent>>,
    order: Mutex<Vec<&'static str>>,
}

impl Recorded {
    fn data(&self) -> Vec<DataEvent> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn time(&self) -> Vec<TimeEvent> {
        self.time.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[fixture]
fn recording_bus() -> (EventBus, Arc<Recorded>) {
    let bus = EventBus::new();
    let recorded = Arc::new(Recorded::default());
    let data = Arc::clone(&recorded);
    bus.subscribe_data(move |event: &DataEvent| {
        data.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    });
    let time = Arc::clone(&recorded);
    bus.subscribe_time(move |event: &TimeEvent| {
        time.time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    });
    (bus, recorded)
}

#[rstest]
fn unknown_commands_reach_the_data_channel(recording_bus: (EventBus, Arc<Recorded>)) {
    let (bus, recorded) = recording_bus;
    assert_eq!(bus.publish(b"ZZ:FOO"), Channel::Data);

    let data = recorded.data();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].raw(), b"ZZ:FOO");
    assert_eq!(data[0].command().kind(), CommandKind::Unknown);
    assert!(recorded.time().is_empty());
}

#[rstest]
fn silent_connections_publish_an_empty_unknown_command(
    recording_bus: (EventBus, Arc<Recorded>),
) {
    let (bus, recorded) = recording_bus;
    let listener = RelayListener::bind(&TcpEndpoint::new("127.0.0.1", 0)).expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let handler = DispatchConnectionHandler::new(
        Arc::new(bus),
        ReadPolicy::new(1024, Duration::from_millis(50)),
    );
    let handle = listener.start(Arc::new(handler)).expect("start listener");

    drop(TcpStream::connect(addr).expect("connect client"));

    let deadline = Instant::now() + Duration::from_secs(2);
    while recorded.data().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    handle.shutdown();
    handle.join().expect("join listener");

    let data = recorded.data();
    assert_eq!(data.len(), 1);
    assert!(data[0].raw().is_empty());
    assert_eq!(data[0].command().kind(), CommandKind::Unknown);
    assert_eq!(data[0].command().primary_token(), "");
    assert!(recorded.time().is_empty());
}

#[rstest]
fn time_reports_reach_the_time_channel(recording_bus: (EventBus, Arc<Recorded>)) {
    let (bus, recorded) = recording_bus;
    assert_eq!(bus.publish(b"CR:GET:0:30:12:1:6:1:25\n"), Channel::Time);

    let time = recorded.time();
    let [TimeEvent::Command(command)] = time.as_slice() else {
        panic!("expected one decoded time command, got {time:?}");
    };
    assert_eq!(command.operation(), TimeOperation::Get);
    let expected = Timestamp::new(2025, 1, 6, 1, 12, 30, 0).expect("valid timestamp");
    assert_eq!(command.timestamp(), Some(expected));
    assert!(recorded.data().is_empty());
}

#[rstest]
fn unknown_time_operations_are_published_as_rejections(
    recording_bus: (EventBus, Arc<Recorded>),
) {
    let (bus, recorded) = recording_bus;
    assert_eq!(bus.publish(b"CR:RESET"), Channel::Time);

    let time = recorded.time();
    let [TimeEvent::Rejected { command, error }] = time.as_slice() else {
        panic!("expected one rejection, got {time:?}");
    };
    assert_eq!(command.raw(), "CR:RESET");
    assert_eq!(
        error,
        &CodecError::UnrecognizedTimeOperation {
            token: "RESET".to_owned()
        }
    );
}

#[test]
fn subscribers_run_in_subscription_order() {
    let bus = EventBus::new();
    let recorded = Arc::new(Recorded::default());
    for label in ["first", "second", "third"] {
        let recorded = Arc::clone(&recorded);
        bus.subscribe_data(move |_: &DataEvent| {
            recorded
                .order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(label);
        });
    }

    bus.publish(b"TS:ON");

    let order = recorded
        .order
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    assert_eq!(order, ["first", "second", "third"]);
    assert_eq!(bus.data_subscribers(), 3);
    assert_eq!(bus.time_subscribers(), 0);
}

#[test]
fn publishing_without_subscribers_is_harmless() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(b"ST"), Channel::Data);
    assert_eq!(bus.publish(b"CR:SET:ACK"), Channel::Time);
}

#[test]
fn link_forwards_encoded_requests() {
    let mut sink = MockTransmissionSink::new();
    for expected in ["CR:GET", "ST", "CR:SET:9:8:7:3:4:2:26"] {
        sink.expect_send()
            .with(function(move |request: &OutboundRequest| {
                request.as_str() == expected
            }))
            .times(1)
            .returning(|_| Ok(()));
    }
    let link = RelayLink::new(Arc::new(sink));

    link.request_time().expect("time request");
    link.request_status().expect("status request");
    let stamp = Timestamp::new(2026, 2, 4, 3, 7, 8, 9).expect("valid timestamp");
    link.set_time(&stamp).expect("set request");
}

#[test]
fn link_surfaces_delivery_errors() {
    let mut sink = MockTransmissionSink::new();
    sink.expect_send().times(1).returning(|request| {
        Err(SendError::ShortWrite {
            written: 0,
            expected: request.len(),
        })
    });
    let link = RelayLink::new(Arc::new(sink));

    let error = link
        .send(&OutboundRequest::from_wire("TS:OFF"))
        .expect_err("delivery should fail");
    assert!(matches!(
        error,
        SendError::ShortWrite {
            written: 0,
            expected: 6
        }
    ));
}
