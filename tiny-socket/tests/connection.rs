//! Integration tests for the endpoint's stream operations.
//!
//! Each test binds a real `tokio::net::TcpListener` on loopback, runs the peer
//! in a background task, and drives an [`Endpoint`] against it.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tiny_socket::{ConnectionState, Endpoint, EndpointError, Operation, SocketSettings};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Upper bound for any single test step; far above every configured timeout.
const STEP: Duration = Duration::from_secs(5);

/// Bind a listener on an OS-chosen loopback port.
async fn bind_peer() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind peer");
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn endpoint_for(addr: SocketAddr, timeout_ms: u64) -> Endpoint {
    let settings = SocketSettings {
        network_port: addr.port(),
        network_timeout: timeout_ms,
        network_wol_address: "127.0.0.1".to_string(),
        network_wol_port: 9,
    };
    Endpoint::new("127.0.0.1", None, settings).expect("valid endpoint")
}

/// Echo every chunk back until the client closes.
async fn echo(mut stream: TcpStream) {
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                if stream.write_all(&buf[..n]).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Accept one connection and hold it open without ever writing.
async fn silent_peer(listener: TcpListener) -> TcpStream {
    let (stream, _) = listener.accept().await.expect("accept");
    stream
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Connect, exchange one request with an echo peer, disconnect.
#[tokio::test]
async fn echo_round_trip_then_disconnect() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        echo(stream).await;
    });

    let mut endpoint = endpoint_for(addr, 50);
    assert_eq!(endpoint.state(), ConnectionState::Idle);

    endpoint.connect().await.expect("connect");
    assert_eq!(endpoint.state(), ConnectionState::Connected);

    let reply = endpoint.send_receive(&[0x01, 0x02]).await.expect("send_receive");
    assert_eq!(reply, vec![0x01, 0x02]);

    endpoint.disconnect().await.expect("disconnect");
    assert_eq!(endpoint.state(), ConnectionState::Closed);

    // The echo loop ends once it sees our FIN.
    tokio::time::timeout(STEP, peer)
        .await
        .expect("peer did not observe disconnect")
        .unwrap();
}

/// Separate write and read calls behave like send_receive.
#[tokio::test]
async fn write_then_read() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        echo(stream).await;
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    endpoint.write(b"hello").await.unwrap();
    assert_eq!(endpoint.read().await.unwrap(), b"hello");
    assert_eq!(endpoint.state(), ConnectionState::Connected);
}

/// A read returns one chunk as delivered; later chunks wait for the next read.
#[tokio::test]
async fn read_returns_single_chunk() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(b"first").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        stream.write_all(b"second").await.unwrap();
        tokio::time::sleep(STEP).await;
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    assert_eq!(endpoint.read().await.unwrap(), b"first");
    assert_eq!(endpoint.read().await.unwrap(), b"second");
}

/// The peer sees the full request before anything is read back.
#[tokio::test]
async fn send_receive_writes_before_reading() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4];
        stream.read_exact(&mut request).await.unwrap();
        stream.write_all(b"ack").await.unwrap();
        tokio::time::sleep(STEP).await;
        request
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    let reply = endpoint.send_receive(b"PING").await.unwrap();
    assert_eq!(reply, b"ack");

    peer.abort();
}

/// A peer that never answers makes the read time out and resets the stream.
#[tokio::test]
async fn silent_peer_read_times_out() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(silent_peer(listener));

    let mut endpoint = endpoint_for(addr, 10);
    endpoint.connect().await.expect("connect");
    let mut peer_stream = peer.await.unwrap();

    let started = tokio::time::Instant::now();
    let err = tokio::time::timeout(STEP, endpoint.read())
        .await
        .expect("read did not settle")
        .unwrap_err();
    assert!(err.is_timeout(), "expected Timeout, got {err:?}");
    assert!(started.elapsed() >= Duration::from_millis(10));
    assert_eq!(endpoint.state(), ConnectionState::Errored);

    // The stream was terminated: the peer sees EOF or a reset.
    let mut buf = [0u8; 8];
    let seen = tokio::time::timeout(STEP, peer_stream.read(&mut buf))
        .await
        .expect("peer never saw termination");
    assert!(matches!(seen, Ok(0) | Err(_)), "peer read {seen:?}");
}

/// A peer that stops reading fills the socket buffers, so the write times out.
#[tokio::test]
async fn write_to_stalled_peer_times_out() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(silent_peer(listener));

    let mut endpoint = endpoint_for(addr, 50);
    endpoint.connect().await.expect("connect");
    let _peer_stream = peer.await.unwrap();

    // Far larger than loopback send plus receive buffers.
    let payload = vec![0x5a; 64 * 1024 * 1024];
    let err = tokio::time::timeout(STEP, endpoint.write(&payload))
        .await
        .expect("write did not settle")
        .unwrap_err();
    assert!(err.is_timeout(), "expected Timeout, got {err:?}");
    assert_eq!(endpoint.state(), ConnectionState::Errored);
}

/// A write failure in send_receive is returned unchanged and no read follows.
#[tokio::test]
async fn send_receive_returns_write_failure() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        // SO_LINGER = 0 makes the drop an abortive reset.
        socket2::SockRef::from(&stream)
            .set_linger(Some(Duration::ZERO))
            .unwrap();
        drop(stream);
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.expect("connect");
    peer.await.unwrap();
    // Let the reset reach the client socket before writing.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = endpoint.send_receive(b"PING").await.unwrap_err();
    match err {
        EndpointError::Transport(e) => assert!(
            matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe
            ),
            "unexpected transport error {e:?}"
        ),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(endpoint.state(), ConnectionState::Errored);
}

/// After a timeout the connection stays unusable; no reconnect from Errored.
#[tokio::test]
async fn errored_connection_rejects_further_operations() {
    let (listener, addr) = bind_peer().await;
    let peer = tokio::spawn(silent_peer(listener));

    let mut endpoint = endpoint_for(addr, 10);
    endpoint.connect().await.unwrap();
    let _peer_stream = peer.await.unwrap();
    assert!(endpoint.read().await.unwrap_err().is_timeout());

    let err = endpoint.send_receive(b"x").await.unwrap_err();
    assert!(matches!(
        err,
        EndpointError::InvalidState {
            operation: Operation::Write,
            state: ConnectionState::Errored
        }
    ));
    assert!(matches!(
        endpoint.connect().await.unwrap_err(),
        EndpointError::InvalidState {
            operation: Operation::Connect,
            ..
        }
    ));
    assert!(matches!(
        endpoint.disconnect().await.unwrap_err(),
        EndpointError::InvalidState { .. }
    ));
}

/// A completed operation is not affected by the timeout elapsing afterwards.
#[tokio::test]
async fn idle_time_after_completion_has_no_effect() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        echo(stream).await;
    });

    let mut endpoint = endpoint_for(addr, 50);
    endpoint.connect().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(endpoint.state(), ConnectionState::Connected);

    endpoint.write(b"still here").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(endpoint.state(), ConnectionState::Connected);

    assert_eq!(endpoint.read().await.unwrap(), b"still here");
    endpoint.disconnect().await.unwrap();
}

/// The peer closing its side surfaces as Eof and closes the connection.
#[tokio::test]
async fn peer_close_is_eof() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    let err = endpoint.read().await.unwrap_err();
    assert!(matches!(err, EndpointError::Eof), "got {err:?}");
    assert_eq!(endpoint.state(), ConnectionState::Closed);

    // Disconnecting an already closed connection is a no-op.
    endpoint.disconnect().await.unwrap();
}

/// A second connect on the same endpoint is rejected without I/O.
#[tokio::test]
async fn connect_twice_is_rejected() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        echo(stream).await;
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    let err = endpoint.connect().await.unwrap_err();
    assert!(matches!(
        err,
        EndpointError::InvalidState {
            operation: Operation::Connect,
            state: ConnectionState::Connected
        }
    ));
    assert_eq!(endpoint.state(), ConnectionState::Connected);
}

/// After disconnect, the endpoint cannot be reused.
#[tokio::test]
async fn closed_endpoint_cannot_reconnect() {
    let (listener, addr) = bind_peer().await;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        echo(stream).await;
    });

    let mut endpoint = endpoint_for(addr, 1000);
    endpoint.connect().await.unwrap();
    endpoint.disconnect().await.unwrap();

    assert!(matches!(
        endpoint.connect().await.unwrap_err(),
        EndpointError::InvalidState {
            state: ConnectionState::Closed,
            ..
        }
    ));
    assert!(matches!(
        endpoint.read().await.unwrap_err(),
        EndpointError::InvalidState { .. }
    ));
}

/// Connecting to a port nobody listens on is a transport error, not a timeout.
#[tokio::test]
async fn refused_connect_is_transport_error() {
    let addr = {
        let (listener, addr) = bind_peer().await;
        drop(listener);
        addr
    };

    let mut endpoint = endpoint_for(addr, 1000);
    let err = endpoint.connect().await.unwrap_err();
    match err {
        EndpointError::Transport(e) => {
            assert_eq!(e.kind(), std::io::ErrorKind::ConnectionRefused)
        }
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(endpoint.state(), ConnectionState::Errored);
}
