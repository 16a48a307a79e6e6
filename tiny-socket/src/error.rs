//! Error types surfaced by [`crate::endpoint::Endpoint`].

use std::io;

use thiserror::Error;

use crate::mac::MacAddressError;
use crate::settings::SettingsError;
use crate::state::ConnectionState;

/// Construction-time failure: no endpoint is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    MacAddress(#[from] MacAddressError),
}

/// Stream operation that was rejected or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Read,
    Write,
    Disconnect,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Read => "read",
            Self::Write => "write",
            Self::Disconnect => "disconnect",
        })
    }
}

/// Runtime failure of an endpoint operation.
#[derive(Error, Debug)]
pub enum EndpointError {
    /// The operation did not settle within `network_timeout`; the stream has
    /// been reset.
    #[error("operation timed out")]
    Timeout,
    /// Error reported by the stream transport, unchanged.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
    /// The peer closed its side of the stream while a read was pending.
    #[error("connection closed by peer")]
    Eof,
    /// The connection's state does not admit `operation`; no I/O was done.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: Operation,
        state: ConnectionState,
    },
    /// `wake_on_lan` was called on an endpoint built without a MAC address.
    #[error("unable to wake on lan: mac address was not configured")]
    MacNotConfigured,
    /// Binding, configuring or sending on the datagram socket failed.
    #[error("wake on lan failed: {0}")]
    WakeOnLan(#[source] io::Error),
}

impl EndpointError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
