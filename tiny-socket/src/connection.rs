//! Per-connection lifecycle manager.
//!
//! A [`Connection`] owns the complete state for one TCP session with a remote
//! host.  Its responsibilities are:
//! - Driving the finite-state machine (see [`crate::state`]).
//! - Owning the `tokio::net::TcpStream` while the stream is open.
//! - Bounding every operation with the connection timeout via [`crate::race`].
//! - Exposing an async connect/read/write/disconnect API.
//!
//! # Operation protocol
//!
//! Each operation follows the same steps:
//!
//! 1. `begin_*` checks the current state admits the operation, moves the
//!    stream out of the connection and returns an `InFlight` guard.
//! 2. The operation future is raced against the timeout.
//! 3. `InFlight::settle` applies the single outcome: completion restores the
//!    stream and moves to the next state; a transport error drops the stream;
//!    a timeout resets the stream.  Both failures end in
//!    [`ConnectionState::Errored`].
//!
//! If the caller drops an operation future before it settles, the guard's
//! `Drop` marks the connection errored; the stream, held by the dropped future,
//! is closed with it.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{EndpointError, Operation};
use crate::race::{race, Settled};
use crate::state::ConnectionState;

/// Largest chunk returned by a single [`Connection::read`].
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A single long-lived TCP connection and its lifecycle state.
///
/// Invariant: `stream` is `Some` exactly while `state` is
/// [`ConnectionState::Connected`] and no operation is in flight.
#[derive(Debug)]
pub struct Connection {
    state: ConnectionState,
    stream: Option<TcpStream>,
    timeout: Duration,
}

impl Connection {
    /// Create an idle connection whose operations are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Idle,
            stream: None,
            timeout,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open the stream to `(host, port)`.  `host` may be a DNS name; name
    /// resolution counts against the timeout.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<(), EndpointError> {
        self.establish(async {
            let stream = TcpStream::connect((host, port)).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        })
        .await
    }

    /// Wait for the next inbound chunk and return it as one unit.
    ///
    /// Returns [`EndpointError::Eof`] and moves to `Closed` when the peer has
    /// shut down its side.
    pub async fn read(&mut self) -> Result<Vec<u8>, EndpointError> {
        let deadline = self.timeout;
        let (op, mut stream) = self.begin_io(Operation::Read)?;
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let outcome = race(deadline, stream.read(&mut buf)).await;
        let n = op.settle(outcome, Some(stream), ConnectionState::Connected)?;

        if n == 0 {
            self.stream = None;
            self.transition(ConnectionState::Closed);
            return Err(EndpointError::Eof);
        }
        buf.truncate(n);
        log::debug!("[conn] ← {n} byte(s)");
        Ok(buf)
    }

    /// Write all of `data` and wait for the flush to complete.
    pub async fn write(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        let deadline = self.timeout;
        let (op, mut stream) = self.begin_io(Operation::Write)?;
        let outcome = race(deadline, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await;
        op.settle(outcome, Some(stream), ConnectionState::Connected)?;
        log::debug!("[conn] → {} byte(s)", data.len());
        Ok(())
    }

    /// Gracefully shut down the stream.
    ///
    /// Succeeds without I/O when the connection is already `Closed`.
    pub async fn disconnect(&mut self) -> Result<(), EndpointError> {
        if self.state == ConnectionState::Closed {
            return Ok(());
        }
        let deadline = self.timeout;
        let (op, mut stream) = self.begin_io(Operation::Disconnect)?;
        let outcome = race(deadline, stream.shutdown()).await;
        op.settle(outcome, Some(stream), ConnectionState::Closed)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            log::debug!("[conn] {} → {}", self.state, next);
            self.state = next;
        }
    }

    fn reject(&self, operation: Operation) -> EndpointError {
        EndpointError::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// Race `dial` against the timeout and keep the stream it produces.
    async fn establish<F>(&mut self, dial: F) -> Result<(), EndpointError>
    where
        F: Future<Output = io::Result<TcpStream>>,
    {
        let deadline = self.timeout;
        let op = self.begin_connect()?;
        let outcome = race(deadline, dial).await;
        let stream = op.settle(outcome, None, ConnectionState::Connected)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn begin_connect(&mut self) -> Result<InFlight<'_>, EndpointError> {
        if self.state != ConnectionState::Idle {
            return Err(self.reject(Operation::Connect));
        }
        self.transition(ConnectionState::Connecting);
        Ok(InFlight::new(self, Operation::Connect))
    }

    /// Start an operation on the open stream, taking the stream out of `self`
    /// for the duration of the operation.
    fn begin_io(&mut self, operation: Operation) -> Result<(InFlight<'_>, TcpStream), EndpointError> {
        if self.state != ConnectionState::Connected {
            return Err(self.reject(operation));
        }
        let stream = self.stream.take().ok_or_else(|| self.reject(operation))?;
        if operation == Operation::Disconnect {
            self.transition(ConnectionState::Disconnecting);
        }
        Ok((InFlight::new(self, operation), stream))
    }
}

// ---------------------------------------------------------------------------
// InFlight guard
// ---------------------------------------------------------------------------

/// Scoped marker for the one operation currently running on a [`Connection`].
///
/// Exactly one of [`InFlight::settle`] or `Drop` decides the resulting state.
struct InFlight<'a> {
    conn: &'a mut Connection,
    operation: Operation,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(conn: &'a mut Connection, operation: Operation) -> Self {
        Self {
            conn,
            operation,
            settled: false,
        }
    }

    /// Apply `outcome` to the connection.
    ///
    /// On completion `stream` goes back into the connection when `next` is
    /// `Connected` and is closed otherwise.
    fn settle<T>(
        mut self,
        outcome: Settled<T>,
        stream: Option<TcpStream>,
        next: ConnectionState,
    ) -> Result<T, EndpointError> {
        self.settled = true;
        match outcome {
            Settled::Completed(value) => {
                if next == ConnectionState::Connected {
                    self.conn.stream = stream;
                }
                self.conn.transition(next);
                Ok(value)
            }
            Settled::Failed(e) => {
                log::debug!("[conn] {} failed: {e}", self.operation);
                drop(stream);
                self.conn.transition(ConnectionState::Errored);
                Err(EndpointError::Transport(e))
            }
            Settled::TimedOut => {
                log::warn!(
                    "[conn] {} timed out after {:?}; resetting stream",
                    self.operation,
                    self.conn.timeout
                );
                if let Some(stream) = stream {
                    reset(stream);
                }
                self.conn.transition(ConnectionState::Errored);
                Err(EndpointError::Timeout)
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::debug!("[conn] {} abandoned before settling", self.operation);
            self.conn.stream = None;
            self.conn.transition(ConnectionState::Errored);
        }
    }
}

/// Close `stream` immediately with a reset instead of a graceful FIN.
fn reset(stream: TcpStream) {
    // SO_LINGER = 0 turns close() into an abortive RST.
    if let Err(e) = socket2::SockRef::from(&stream).set_linger(Some(Duration::ZERO)) {
        log::debug!("[conn] failed to set SO_LINGER before reset: {e}");
    }
    drop(stream);
}
