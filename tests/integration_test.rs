//! End-to-end tests against an in-process mock scripting host.
//!
//! The mock listens on an ephemeral port, reads one script per connection up
//! to the end-packet marker, records it, and replies with canned text framed
//! the way the real host frames replies.

use skybridge::{Angle, BridgeError, SyncReply, TcpScriptHost, TelescopeBridge, Tracking};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const END_MARKER: &str = "/* Socket End Packet */";

/// A scripting host double: one canned reply per accepted connection.
struct MockHost {
    addr: SocketAddr,
    scripts: Arc<Mutex<Vec<String>>>,
}

impl MockHost {
    /// Serve `replies` to sequential connections, then stop accepting.
    async fn serve(replies: Vec<&'static str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let scripts = Arc::new(Mutex::new(Vec::new()));

        let seen = scripts.clone();
        tokio::spawn(async move {
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                let script = read_script(&mut socket).await;
                seen.lock().unwrap().push(script);
                socket.write_all(reply.as_bytes()).await.unwrap();
            }
        });

        Self { addr, scripts }
    }

    fn bridge(&self) -> TelescopeBridge {
        let host = TcpScriptHost::new(self.addr.ip().to_string(), self.addr.port())
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(1));
        TelescopeBridge::with_host(host)
    }

    fn script(&self, index: usize) -> String {
        self.scripts.lock().unwrap()[index].clone()
    }
}

async fn read_script(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if String::from_utf8_lossy(&buffer).contains(END_MARKER) {
            break;
        }
    }
    String::from_utf8(buffer).unwrap()
}

#[tokio::test]
async fn test_status_round_trip() {
    let mock = MockHost::serve(vec![
        r#"{"az": 120.5, "alt": 45.0, "tr": true, "sl": false}|No error. Error = 0."#,
    ])
    .await;

    let status = mock.bridge().get_status().await.unwrap();
    assert_eq!(status.azimuth, 120.5);
    assert_eq!(status.altitude, 45.0);
    assert!(status.is_tracking);
    assert!(!status.is_slew_complete);

    let script = mock.script(0);
    assert!(script.contains("GetAzAlt"));
    assert!(script.contains(END_MARKER));
}

#[tokio::test]
async fn test_status_not_connected() {
    let mock = MockHost::serve(vec!["Not connected|No error. Error = 0."]).await;
    // The status query is retried on transport failures only; a reported
    // disconnect must surface on the first attempt.
    let err = mock.bridge().get_status().await.unwrap_err();
    assert!(matches!(err, BridgeError::NotConnected));
    assert_eq!(mock.scripts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_slew_sends_target_and_tracking() {
    let mock = MockHost::serve(vec!["0|No error. Error = 0."]).await;

    mock.bridge()
        .slew_and_track(
            Some(Angle::from(120.5)),
            Some(Angle::from(45.0)),
            Tracking::On,
        )
        .await
        .unwrap();

    let script = mock.script(0);
    assert!(script.contains(r#"var TargetAz = "120.5";"#));
    assert!(script.contains(r#"var TargetAlt = "45";"#));
    assert!(script.contains(r#"var Track = "1";"#));
    assert!(script.contains("SlewToAzAlt"));
}

#[tokio::test]
async fn test_track_only_slew_renders_empty_target() {
    let mock = MockHost::serve(vec!["|No error. Error = 0."]).await;

    mock.bridge()
        .slew_and_track(None, None, Tracking::On)
        .await
        .unwrap();

    let script = mock.script(0);
    assert!(script.contains(r#"var TargetAz = "";"#));
    assert!(script.contains(r#"var TargetAlt = "";"#));
    assert!(script.contains("SetTracking"));
}

#[tokio::test]
async fn test_slew_error_code_is_surfaced() {
    let mock = MockHost::serve(vec!["1|No error. Error = 0."]).await;

    let err = mock
        .bridge()
        .slew_and_track(Some(Angle::from(10.0)), Some(Angle::from(10.0)), Tracking::Off)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Slew(code) if code == "1"));
}

#[tokio::test]
async fn test_sync_deferred_shape() {
    let mock =
        MockHost::serve(vec![r#"{"az": 0, "alt": 0, "tr": 1, "sl": 1}|No error. Error = 0."#])
            .await;

    match mock.bridge().sync("5.5912", "-5.3894").await.unwrap() {
        SyncReply::Deferred(status) => {
            assert_eq!(status.azimuth, 0.0);
            assert!(status.is_tracking);
        }
        other => panic!("expected deferred reply, got {other:?}"),
    }

    let script = mock.script(0);
    assert!(script.contains(r#"var TargetRa = "5.5912";"#));
    assert!(script.contains(r#"var TargetDec = "-5.3894";"#));
}

#[tokio::test]
async fn test_sync_completed_shape() {
    let mock = MockHost::serve(vec!["Synced|No error. Error = 0."]).await;
    let reply = mock.bridge().sync("5.5912", "-5.3894").await.unwrap();
    assert_eq!(reply, SyncReply::Completed);
}

#[tokio::test]
async fn test_disconnect_round_trip() {
    let mock = MockHost::serve(vec!["Disconnected|No error. Error = 0."]).await;
    mock.bridge().disconnect_mount().await.unwrap();
    assert!(mock.script(0).contains("Disconnect()"));
}

#[tokio::test]
async fn test_partial_flushes_are_reassembled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_script(&mut socket).await;
        // Flush the reply in dribs, the way a busy host does.
        for piece in [r#"{"az": 120.5, "alt": 45.0,"#, r#" "tr": 1, "sl": 0}"#, "|No error. Error = 0."] {
            socket.write_all(piece.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let host = TcpScriptHost::new(addr.ip().to_string(), addr.port())
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(2));
    let status = TelescopeBridge::with_host(host).get_status().await.unwrap();
    assert_eq!(status.azimuth, 120.5);
    assert!(status.is_tracking);
}

#[tokio::test]
async fn test_timeout_does_not_contaminate_next_call() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First connection: swallow the script and never reply.
        let (mut first, _) = listener.accept().await.unwrap();
        read_script(&mut first).await;

        // Second connection: healthy status reply.
        let (mut second, _) = listener.accept().await.unwrap();
        read_script(&mut second).await;
        second
            .write_all(br#"{"az": 1.0, "alt": 2.0, "tr": 0, "sl": 1}|No error. Error = 0."#)
            .await
            .unwrap();

        // Keep the first socket open past the client timeout.
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(first);
    });

    let host = TcpScriptHost::new(addr.ip().to_string(), addr.port())
        .with_timeouts(Duration::from_secs(1), Duration::from_millis(200));
    let bridge = TelescopeBridge::with_host(host);

    let err = bridge.sync("5.59", "-5.39").await.unwrap_err();
    assert!(matches!(err, BridgeError::Timeout(_)));

    let status = bridge.get_status().await.unwrap();
    assert_eq!(status.azimuth, 1.0);
}

#[tokio::test]
async fn test_concurrent_calls_never_interleave() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let in_flight_srv = in_flight.clone();
    let peak_srv = peak.clone();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let in_flight = in_flight_srv.clone();
            let peak = peak_srv.clone();
            tokio::spawn(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                read_script(&mut socket).await;
                // Hold the exchange open long enough for overlap to show up
                // if the gate ever let two scripts through at once.
                tokio::time::sleep(Duration::from_millis(50)).await;
                socket
                    .write_all(br#"{"az": 0, "alt": 0, "tr": 0, "sl": 1}|No error. Error = 0."#)
                    .await
                    .unwrap();

                in_flight.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    let host = TcpScriptHost::new(addr.ip().to_string(), addr.port())
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(2));
    let bridge = Arc::new(TelescopeBridge::with_host(host));

    let mut calls = Vec::new();
    for _ in 0..4 {
        let bridge = bridge.clone();
        calls.push(tokio::spawn(async move { bridge.get_status().await }));
    }
    for call in calls {
        call.await.unwrap().unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 1, "exchanges overlapped");
}

#[tokio::test]
async fn test_connection_refused_is_a_connection_error() {
    // Bind then drop to obtain a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let host = TcpScriptHost::new(addr.ip().to_string(), addr.port())
        .with_timeouts(Duration::from_millis(500), Duration::from_millis(500));
    let err = TelescopeBridge::with_host(host)
        .slew_and_track(None, None, Tracking::Off)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Connection(_)));
}
