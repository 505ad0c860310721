//! TCP connection/session lifecycle.
//!
//! One [`MorseSession`] owns one socket: either a listener that accepts
//! exactly one inbound peer (server role) or an outbound connection (client
//! role). Once a peer is attached, a background receive loop turns incoming
//! bytes into [`SessionEvent::MessageReceived`] events; everything the
//! session has to say flows through a single event channel.
//!
//! # Lifecycle
//!
//! ```text
//! 1. MorseSession::new(event_tx)                  → Idle
//! 2. session.start_server(port)                   → Connecting
//!       └─ emits Listening { addr }, accepts one peer
//!    session.start_client(host, port)             → Connecting
//! 3. peer attached                                → Connected
//!       ├─ emits Connected { peer }
//!       └─ receive loop runs until close or remote hangup
//! 4. session.close() / remote close / I/O failure → Closed (terminal)
//! ```
//!
//! A closed session never reconnects; construct a new one to retry. There is
//! no framing on the wire: each `send` writes one UTF-8 payload, and one
//! read on the far side may observe a fragment of it or several payloads
//! coalesced.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use morselink_core::{LinkState, SessionError, SessionEvent, SessionRole};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Largest chunk a single read produces.
const RECV_BUFFER_LEN: usize = 4096;

// MARK: - MorseSession

/// A single peer-to-peer text session over TCP.
///
/// Expected failures (no peer, refused connection, remote hangup) never
/// cross this API as errors. They surface as [`SessionEvent`]s on the
/// channel handed to [`MorseSession::new`], each followed by full cleanup.
pub struct MorseSession {
    shared: Arc<Shared>,
}

struct Shared {
    events: mpsc::Sender<SessionEvent>,
    role: Mutex<Option<SessionRole>>,
    state: Mutex<LinkState>,
    /// Guards the receive loop and all socket operations. Cleared exactly
    /// once; the thread that clears it performs the cleanup.
    running: AtomicBool,
    /// The single peer connection's write half. `None` until a peer is
    /// attached and again after close.
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    /// Accept and receive tasks, aborted on close to unblock pending I/O.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MorseSession {
    /// New idle session. Events are delivered through `events` in the order
    /// they occur; the consumer owns marshaling them further.
    pub fn new(events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            shared: Arc::new(Shared {
                events,
                role: Mutex::new(None),
                state: Mutex::new(LinkState::Idle),
                running: AtomicBool::new(true),
                writer: tokio::sync::Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Bind `0.0.0.0:port` and wait for exactly one inbound peer.
    ///
    /// Emits `Listening` with the actual bound address (port 0 resolves to a
    /// concrete port), then `Connected` once a peer arrives. The listener is
    /// released right after the accept. Bind or accept failure emits `Error`
    /// and closes the session; there is no retry.
    pub async fn start_server(&self, port: u16) {
        if !self.begin(SessionRole::Server).await {
            return;
        }

        let listener = match bind_listener(port) {
            Ok(listener) => listener,
            Err(source) => {
                self.shared.fail(SessionError::Bind { port, source }).await;
                return;
            }
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.shared.fail(SessionError::Bind { port, source }).await;
                return;
            }
        };

        info!("listening on {addr}");
        self.shared.emit(SessionEvent::Listening { addr }).await;

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    // Exactly one peer per session; stop listening now.
                    drop(listener);
                    Shared::attach_peer(&shared, stream, peer).await;
                }
                Err(source) => {
                    if shared.running.load(Ordering::SeqCst) {
                        shared.fail(SessionError::Accept { source }).await;
                    }
                }
            }
        });
        self.shared.tasks.lock().unwrap().push(handle);
    }

    /// Connect out to `host:port`.
    ///
    /// Runs on the async runtime, so no caller thread blocks for the
    /// duration of the connect. Emits `Connected` on success; failure emits
    /// `Error` and closes the session.
    pub async fn start_client(&self, host: &str, port: u16) {
        if !self.begin(SessionRole::Client).await {
            return;
        }

        match TcpStream::connect((host, port)).await {
            Ok(stream) => {
                let peer = match stream.peer_addr() {
                    Ok(peer) => peer,
                    Err(source) => {
                        let addr = format!("{host}:{port}");
                        self.shared.fail(SessionError::Connect { addr, source }).await;
                        return;
                    }
                };
                Shared::attach_peer(&self.shared, stream, peer).await;
            }
            Err(source) => {
                let addr = format!("{host}:{port}");
                self.shared.fail(SessionError::Connect { addr, source }).await;
            }
        }
    }

    /// Write the UTF-8 bytes of `text` to the peer in one call.
    ///
    /// Without an attached peer this emits `Error(NotConnected)` and touches
    /// no socket. A write failure emits `Error(Send)` and closes the
    /// session.
    pub async fn send(&self, text: &str) {
        let payload = Bytes::copy_from_slice(text.as_bytes());

        let mut writer = self.shared.writer.lock().await;
        let Some(stream) = writer.as_mut() else {
            drop(writer);
            self.shared.emit(SessionEvent::Error(SessionError::NotConnected)).await;
            return;
        };

        match stream.write_all(&payload).await {
            Ok(()) => {
                debug!("sent {} bytes", payload.len());
            }
            Err(source) => {
                drop(writer);
                warn!("send failed: {source}");
                self.shared.fail(SessionError::Send { source }).await;
            }
        }
    }

    /// Tear the session down. Idempotent and safe from any state, including
    /// while a read or accept is blocked: those tasks are aborted, which is
    /// what unblocks them. Emits no event by itself.
    pub async fn close(&self) {
        self.shared.cleanup().await;
    }

    pub fn state(&self) -> LinkState {
        *self.shared.state.lock().unwrap()
    }

    pub fn role(&self) -> Option<SessionRole> {
        *self.shared.role.lock().unwrap()
    }

    /// Claim the role for this session, or report that it was already
    /// started. The role is set once and survives close.
    async fn begin(&self, role: SessionRole) -> bool {
        let already = {
            let mut current = self.shared.role.lock().unwrap();
            match *current {
                Some(existing) => Some(existing),
                None => {
                    *current = Some(role);
                    *self.shared.state.lock().unwrap() = LinkState::Connecting;
                    None
                }
            }
        };
        match already {
            Some(existing) => {
                self.shared
                    .emit(SessionEvent::Error(SessionError::AlreadyStarted { role: existing }))
                    .await;
                false
            }
            None => true,
        }
    }
}

/// All-interfaces listener with a backlog of one: a session only ever
/// accepts a single peer.
fn bind_listener(port: u16) -> std::io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(SocketAddr::from(([0, 0, 0, 0], port)))?;
    socket.listen(1)
}

// MARK: - Shared internals

impl Shared {
    async fn emit(&self, event: SessionEvent) {
        // The consumer may already be gone during shutdown.
        if self.events.send(event).await.is_err() {
            debug!("event consumer dropped");
        }
    }

    /// Report a socket-layer failure and tear the session down.
    async fn fail(&self, error: SessionError) {
        self.emit(SessionEvent::Error(error)).await;
        self.cleanup().await;
    }

    /// Store the peer connection and start the receive loop.
    async fn attach_peer(this: &Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        let (reader, writer) = stream.into_split();
        {
            let mut slot = this.writer.lock().await;
            if !this.running.load(Ordering::SeqCst) {
                // Closed while connecting; the socket drops here.
                return;
            }
            *slot = Some(writer);
            *this.state.lock().unwrap() = LinkState::Connected;
        }

        info!("peer connected: {peer}");
        this.emit(SessionEvent::Connected { peer }).await;

        let shared = Arc::clone(this);
        let handle = tokio::spawn(async move { shared.receive_loop(reader).await });
        this.tasks.lock().unwrap().push(handle);
    }

    /// One loop per session, for the lifetime of the peer connection.
    ///
    /// A zero-length read is the orderly remote close. A read error after
    /// `close()` has begun is the expected way a blocked read dies and is
    /// not reported again.
    async fn receive_loop(self: Arc<Self>, mut reader: OwnedReadHalf) {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        loop {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            let read = reader.read(&mut buf).await;
            // close() may have started while the read was parked; after it
            // has, nothing more is reported from here.
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            match read {
                Ok(0) => {
                    info!("remote closed the connection");
                    self.emit(SessionEvent::Disconnected).await;
                    self.cleanup().await;
                    break;
                }
                Ok(n) => match std::str::from_utf8(&buf[..n]) {
                    Ok(text) => {
                        debug!("received {n} bytes");
                        self.emit(SessionEvent::MessageReceived { text: text.to_string() }).await;
                    }
                    Err(_) => {
                        self.fail(SessionError::Decode).await;
                        break;
                    }
                },
                Err(source) => {
                    self.fail(SessionError::Receive { source }).await;
                    break;
                }
            }
        }
    }

    /// Idempotent teardown: the first caller through the flag does the work.
    async fn cleanup(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        *self.state.lock().unwrap() = LinkState::Closed;

        if let Some(mut stream) = self.writer.lock().await.take() {
            // Shutdown errors on an already-dead socket are expected.
            let _ = stream.shutdown().await;
        }

        // Aborting the accept/receive tasks releases the listener and
        // unblocks a read parked on a silent peer. A task that reaches here
        // itself has no awaits left before it exits.
        let handles = std::mem::take(&mut *self.tasks.lock().unwrap());
        for handle in handles {
            handle.abort();
        }
        debug!("session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout, Duration};

    const WAIT: Duration = Duration::from_secs(5);

    async fn next_event(rx: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
        timeout(WAIT, rx.recv())
            .await
            .expect("event within timeout")
            .expect("event channel open")
    }

    async fn wait_for_state(session: &MorseSession, state: LinkState) {
        timeout(WAIT, async {
            while session.state() != state {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("session did not reach {state:?}"));
    }

    type Pair = (MorseSession, mpsc::Receiver<SessionEvent>, MorseSession, mpsc::Receiver<SessionEvent>);

    async fn connected_pair() -> Pair {
        let (server_tx, mut server_rx) = mpsc::channel(16);
        let server = MorseSession::new(server_tx);
        server.start_server(0).await;
        let addr = match next_event(&mut server_rx).await {
            SessionEvent::Listening { addr } => addr,
            other => panic!("expected Listening, got {other:?}"),
        };

        let (client_tx, mut client_rx) = mpsc::channel(16);
        let client = MorseSession::new(client_tx);
        client.start_client("127.0.0.1", addr.port()).await;

        match next_event(&mut client_rx).await {
            SessionEvent::Connected { .. } => {}
            other => panic!("expected client Connected, got {other:?}"),
        }
        match next_event(&mut server_rx).await {
            SessionEvent::Connected { .. } => {}
            other => panic!("expected server Connected, got {other:?}"),
        }

        (server, server_rx, client, client_rx)
    }

    #[tokio::test]
    async fn loopback_send_is_received() {
        let (server, mut server_rx, client, mut client_rx) = connected_pair().await;
        assert_eq!(server.role(), Some(SessionRole::Server));
        assert_eq!(client.role(), Some(SessionRole::Client));
        assert!(server.state().is_active());

        client.send("HELLO").await;
        match next_event(&mut server_rx).await {
            SessionEvent::MessageReceived { text } => assert_eq!(text, "HELLO"),
            other => panic!("expected MessageReceived, got {other:?}"),
        }

        server.send("... --- ...").await;
        match next_event(&mut client_rx).await {
            SessionEvent::MessageReceived { text } => assert_eq!(text, "... --- ..."),
            other => panic!("expected MessageReceived, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_close_unblocks_blocked_client_read() {
        let (server, _server_rx, client, mut client_rx) = connected_pair().await;

        server.close().await;

        match next_event(&mut client_rx).await {
            SessionEvent::Disconnected | SessionEvent::Error(SessionError::Receive { .. }) => {}
            other => panic!("expected Disconnected or receive error, got {other:?}"),
        }
        wait_for_state(&client, LinkState::Closed).await;
        wait_for_state(&server, LinkState::Closed).await;
    }

    #[tokio::test]
    async fn send_without_peer_reports_locally() {
        let (tx, mut rx) = mpsc::channel(16);
        let session = MorseSession::new(tx);

        session.send("HELLO").await;

        match next_event(&mut rx).await {
            SessionEvent::Error(SessionError::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
        assert_eq!(session.state(), LinkState::Idle);
    }

    #[tokio::test]
    async fn closed_session_rejects_send() {
        let (_server, _server_rx, client, mut client_rx) = connected_pair().await;

        client.close().await;
        assert_eq!(client.state(), LinkState::Closed);

        client.send("HELLO").await;
        match next_event(&mut client_rx).await {
            SessionEvent::Error(SessionError::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn double_close_is_silent() {
        let (server, _server_rx, client, mut client_rx) = connected_pair().await;

        client.close().await;
        client.close().await;
        assert_eq!(client.state(), LinkState::Closed);

        // close() itself emits nothing, so the client channel stays quiet.
        assert!(timeout(Duration::from_millis(200), client_rx.recv()).await.is_err());
        drop(server);
    }

    #[tokio::test]
    async fn second_start_reports_already_started() {
        let (tx, mut rx) = mpsc::channel(16);
        let session = MorseSession::new(tx);

        session.start_server(0).await;
        match next_event(&mut rx).await {
            SessionEvent::Listening { .. } => {}
            other => panic!("expected Listening, got {other:?}"),
        }

        session.start_client("127.0.0.1", 1).await;
        match next_event(&mut rx).await {
            SessionEvent::Error(SessionError::AlreadyStarted { role: SessionRole::Server }) => {}
            other => panic!("expected AlreadyStarted, got {other:?}"),
        }

        session.close().await;
    }

    #[tokio::test]
    async fn bind_conflict_reports_error_and_closes() {
        let (tx_a, mut rx_a) = mpsc::channel(16);
        let first = MorseSession::new(tx_a);
        first.start_server(0).await;
        let addr = match next_event(&mut rx_a).await {
            SessionEvent::Listening { addr } => addr,
            other => panic!("expected Listening, got {other:?}"),
        };

        let (tx_b, mut rx_b) = mpsc::channel(16);
        let second = MorseSession::new(tx_b);
        second.start_server(addr.port()).await;

        match next_event(&mut rx_b).await {
            SessionEvent::Error(SessionError::Bind { port, .. }) => assert_eq!(port, addr.port()),
            other => panic!("expected Bind error, got {other:?}"),
        }
        assert_eq!(second.state(), LinkState::Closed);

        first.close().await;
    }

    #[tokio::test]
    async fn connect_refused_reports_error_and_closes() {
        // Bind-then-drop to get a port with nothing listening on it.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let (tx, mut rx) = mpsc::channel(16);
        let session = MorseSession::new(tx);
        session.start_client("127.0.0.1", port).await;

        match next_event(&mut rx).await {
            SessionEvent::Error(SessionError::Connect { addr, .. }) => {
                assert_eq!(addr, format!("127.0.0.1:{port}"));
            }
            other => panic!("expected Connect error, got {other:?}"),
        }
        assert_eq!(session.state(), LinkState::Closed);
    }
}
