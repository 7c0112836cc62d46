//! Connection handling abstractions for the relay listener.

use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

use relay_config::Config;

const CHUNK_BYTES: usize = 1024;
const MIN_IDLE: Duration = Duration::from_millis(1);

/// Handles accepted socket connections.
///
/// The listener calls `handle` on its own thread and waits for it to return
/// before accepting the next connection. The stream is closed when the
/// handler drops it.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}

/// Limits applied when reading one message from a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    max_bytes: usize,
    idle: Duration,
}

impl ReadPolicy {
    /// Builds a policy reading at most `max_bytes` and treating `idle` of
    /// silence as the end of the message.
    ///
    /// Zero values are raised to the smallest usable limit.
    #[must_use]
    pub fn new(max_bytes: usize, idle: Duration) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
            idle: idle.max(MIN_IDLE),
        }
    }

    /// Builds the policy from the shared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_request_bytes(), config.read_idle())
    }

    /// Largest number of bytes read from one connection.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Silence that ends a read.
    #[must_use]
    pub const fn idle(&self) -> Duration {
        self.idle
    }
}

/// Reads one message.
///
/// Reading stops at the first `\n` (kept in the result), at end of stream,
/// once `limit` bytes have arrived, or when the reader reports a timeout.
/// The caller arms the timeout (for sockets, with `set_read_timeout`), so a
/// quiet peer ends the message with whatever has arrived so far.
pub(crate) fn read_message<R: Read>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(limit.min(CHUNK_BYTES));
    let mut chunk = [0_u8; CHUNK_BYTES];
    while buffer.len() < limit {
        let room = (limit - buffer.len()).min(CHUNK_BYTES);
        let window = &mut chunk[..room];
        let bytes_read = match read_chunk_with_retry(reader, window) {
            Ok(bytes_read) => bytes_read,
            Err(error) if is_idle(&error) => break,
            Err(error) => return Err(error),
        };
        if bytes_read == 0 {
            break;
        }
        let received = &window[..bytes_read];
        if let Some(pos) = received.iter().position(|byte| *byte == b'\n') {
            buffer.extend_from_slice(&received[..=pos]);
            break;
        }
        buffer.extend_from_slice(received);
    }
    Ok(buffer)
}

fn read_chunk_with_retry<R: Read>(reader: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

fn is_idle(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rstest::rstest;

    use super::*;

    /// Reader replaying scripted chunks, then reporting a timeout.
    struct ScriptedReader {
        script: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedReader {
        fn new(script: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.script.pop_front() {
                Some(Ok(bytes)) => {
                    let len = bytes.len().min(buf.len());
                    buf[..len].copy_from_slice(&bytes[..len]);
                    if len < bytes.len() {
                        self.script.push_front(Ok(bytes[len..].to_vec()));
                    }
                    Ok(len)
                }
                Some(Err(error)) => Err(error),
                None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
            }
        }
    }

    fn chunk(text: &str) -> io::Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    #[test]
    fn stops_at_newline() {
        let mut reader = ScriptedReader::new(vec![chunk("TS:ON\nTS:OFF")]);
        let message = read_message(&mut reader, 1024).expect("read");
        assert_eq!(message, b"TS:ON\n");
    }

    #[test]
    fn joins_partial_reads_until_end_of_stream() {
        let mut reader = ScriptedReader::new(vec![chunk("CR:GET:1"), chunk(":2:3"), chunk("")]);
        let message = read_message(&mut reader, 1024).expect("read");
        assert_eq!(message, b"CR:GET:1:2:3");
    }

    #[rstest]
    #[case::would_block(io::ErrorKind::WouldBlock)]
    #[case::timed_out(io::ErrorKind::TimedOut)]
    fn idle_gap_ends_message(#[case] kind: io::ErrorKind) {
        let mut reader = ScriptedReader::new(vec![
            chunk("DR:21"),
            Err(io::Error::from(kind)),
            chunk(":ignored"),
        ]);
        let message = read_message(&mut reader, 1024).expect("read");
        assert_eq!(message, b"DR:21");
    }

    #[test]
    fn retries_interrupted_reads() {
        let mut reader = ScriptedReader::new(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            chunk("ST\n"),
        ]);
        let message = read_message(&mut reader, 1024).expect("read");
        assert_eq!(message, b"ST\n");
    }

    #[test]
    fn truncates_at_limit() {
        let mut reader = ScriptedReader::new(vec![chunk("ABCDEFGHIJ")]);
        let message = read_message(&mut reader, 4).expect("read");
        assert_eq!(message, b"ABCD");
    }

    #[test]
    fn limit_applies_beyond_one_chunk() {
        let payload = "x".repeat(3000);
        let mut reader = ScriptedReader::new(vec![chunk(&payload)]);
        let message = read_message(&mut reader, 1500).expect("read");
        assert_eq!(message.len(), 1500);
    }

    #[test]
    fn empty_connection_yields_empty_message() {
        let mut reader = ScriptedReader::new(vec![chunk("")]);
        let message = read_message(&mut reader, 1024).expect("read");
        assert!(message.is_empty());
    }

    #[test]
    fn surfaces_hard_errors() {
        let mut reader = ScriptedReader::new(vec![
            chunk("TS"),
            Err(io::Error::from(io::ErrorKind::ConnectionReset)),
        ]);
        let error = read_message(&mut reader, 1024).expect_err("reset should fail");
        assert_eq!(error.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn policy_raises_zero_limits() {
        let policy = ReadPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_bytes(), 1);
        assert_eq!(policy.idle(), MIN_IDLE);
    }
}
