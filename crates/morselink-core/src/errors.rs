use thiserror::Error;

use crate::types::SessionRole;

/// Socket-layer failures, delivered through `SessionEvent::Error`.
///
/// An orderly remote close is not in this taxonomy; it is reported as
/// `SessionEvent::Disconnected`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bind on 0.0.0.0:{port} failed: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept failed: {source}")]
    Accept {
        #[source]
        source: std::io::Error,
    },

    #[error("not connected")]
    NotConnected,

    #[error("send failed: {source}")]
    Send {
        #[source]
        source: std::io::Error,
    },

    #[error("receive failed: {source}")]
    Receive {
        #[source]
        source: std::io::Error,
    },

    #[error("received bytes are not valid UTF-8")]
    Decode,

    #[error("session already started as {role}")]
    AlreadyStarted { role: SessionRole },
}

/// Failures loading a `LinkConfig` file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
