use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

// MARK: - SessionRole

/// Role of an endpoint in a MorseLink session, fixed at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    /// Listens and accepts exactly one inbound peer.
    Server,
    /// Connects out to a known peer.
    Client,
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}

// MARK: - LinkState

/// Session lifecycle. `Closed` is terminal; a session never reconnects,
/// construct a new one to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Connected,
    Closed,
}

impl LinkState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// MARK: - SessionEvent

/// Events a session delivers to its consumer.
///
/// All variants flow through a single channel, in the order they occur. The
/// consumer owns marshaling them onto whatever loop presents them.
#[derive(Debug)]
pub enum SessionEvent {
    /// The listening socket is bound (server role only). Carries the actual
    /// bound address, so port 0 resolves to a concrete port.
    Listening { addr: SocketAddr },

    /// The single peer connection is established.
    Connected { peer: SocketAddr },

    /// The remote side closed the connection in an orderly way. Not an
    /// error; the session is cleaned up when this is observed.
    Disconnected,

    /// A chunk of UTF-8 text arrived. There is no framing on the wire, so
    /// one read may carry a fragment of a message or several coalesced
    /// messages.
    MessageReceived { text: String },

    /// A socket-layer failure. Full cleanup follows the report; the
    /// session never stays half-open after emitting one of these.
    Error(SessionError),
}

// MARK: - RemoteEndpoint

/// Peer address a client-role session connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    pub host: String,
    pub port: u16,
}

impl RemoteEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// MARK: - MorseSymbol

/// One element of a transcoded message.
///
/// The wire format is plain text: `.` and `-` inside a glyph, one space
/// between letters, `/` between words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseSymbol {
    Dot,
    Dash,
    LetterGap,
    WordGap,
}

impl MorseSymbol {
    /// Parse one character of wire-format Morse text. Anything else is not
    /// a symbol and is skipped by the timeline builder.
    pub fn from_wire(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Dot),
            '-' => Some(Self::Dash),
            ' ' => Some(Self::LetterGap),
            '/' => Some(Self::WordGap),
            _ => None,
        }
    }
}

// MARK: - SignalLevel

/// Physical flash state applied through a signal sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    On,
    Off,
}

// MARK: - SignalEvent

/// One step of a flash timeline: hold `level` for `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub level: SignalLevel,
    pub duration_ms: u64,
}

impl SignalEvent {
    pub const fn new(level: SignalLevel, duration_ms: u64) -> Self {
        Self { level, duration_ms }
    }
}

// MARK: - TimingScheme

/// Which flash ratio table to use. Two variants exist historically; a built
/// timeline uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingScheme {
    /// 1/5/5 ratios: dash and letter/word gaps all span five units.
    #[default]
    Classic,
    /// 1/3/2/6 ratios: three-unit dash, two-unit letter gap, six-unit word gap.
    Compact,
}
