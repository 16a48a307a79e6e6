//! Connection finite-state machine (FSM) types.
//!
//! Transitions are driven only by the operations in [`crate::connection`]:
//!
//! ```text
//!  IDLE ──connect──▶ CONNECTING ──ok──▶ CONNECTED ──disconnect──▶ DISCONNECTING ──ok──▶ CLOSED
//!                         │                 │  ▲                        │
//!                         │                 │  └── read / write ok      │
//!                         │                 │                           │
//!                         └── error / timeout ─────────────┬────────────┘
//!                                           │              ▼
//!                                           └─────────▶ ERRORED
//! ```
//!
//! `Closed` and `Errored` are terminal: there is no path back to `Idle`.

/// All possible states of a [`crate::connection::Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Constructed, no connect attempted yet.
    #[default]
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Stream open; read and write are allowed.
    Connected,
    /// Graceful shutdown in progress.
    Disconnecting,
    /// Shut down cleanly, or the peer closed the stream.
    Closed,
    /// A transport error or timeout ended the connection.
    Errored,
}

impl ConnectionState {
    /// `true` for states that can never be left again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Closed => "closed",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}
