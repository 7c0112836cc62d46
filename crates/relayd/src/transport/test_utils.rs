//! Test helpers for the transport module.

use std::net::TcpStream;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::{ConnectionHandler, read_message};

/// One served connection as seen by [`RecordingHandler`].
#[derive(Debug, Clone)]
pub(crate) struct ServedConnection {
    pub(crate) payload: Vec<u8>,
    pub(crate) started: Instant,
    pub(crate) finished: Instant,
}

/// Handler that reads each message, holds the connection for `hold`, and
/// records what it saw.
pub(crate) struct RecordingHandler {
    hold: Duration,
    served: Arc<Mutex<Vec<ServedConnection>>>,
}

impl RecordingHandler {
    pub(crate) fn new(hold: Duration) -> (Arc<Mutex<Vec<ServedConnection>>>, Arc<Self>) {
        let served = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(Self {
            hold,
            served: Arc::clone(&served),
        });
        (served, handler)
    }
}

impl ConnectionHandler for RecordingHandler {
    fn handle(&self, mut stream: TcpStream) {
        let started = Instant::now();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .expect("set read timeout");
        let payload = read_message(&mut stream, 1024).unwrap_or_default();
        thread::sleep(self.hold);
        self.served
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ServedConnection {
                payload,
                started,
                finished: Instant::now(),
            });
    }
}

/// Polls `served` until it holds `expected` entries or two seconds pass.
pub(crate) fn wait_for_served(
    served: &Mutex<Vec<ServedConnection>>,
    expected: usize,
) -> Vec<ServedConnection> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let snapshot = served
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if snapshot.len() >= expected || Instant::now() >= deadline {
            return snapshot;
        }
        thread::sleep(Duration::from_millis(10));
    }
}
