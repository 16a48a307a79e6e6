//! `tiny-socket` - a timeout-bounded TCP request/response endpoint with
//! Wake-on-LAN support.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────────────────────────────┐
//!  │                Endpoint                  │
//!  │  host · Option<MacAddress> · settings    │
//!  └────┬─────────────────────────────┬───────┘
//!       │ connect/read/write/         │ wake_on_lan
//!       │ send_receive/disconnect     │
//!  ┌────▼──────────────────┐     ┌────▼─────────────────┐
//!  │      Connection       │     │         wol          │
//!  │ state machine + race  │     │ ephemeral UdpSocket  │
//!  └────┬──────────────────┘     └────┬─────────────────┘
//!       │ TcpStream                   │ MagicPacket (102 bytes)
//!       ▼                             ▼
//! ```
//!
//! Each module has a single responsibility:
//! - [`endpoint`]      - public facade, construction-time validation
//! - [`connection`]    - per-connection lifecycle and operation protocol
//! - [`race`]          - operation-versus-timeout combinator
//! - [`state`]         - finite-state-machine types
//! - [`settings`]      - settings record and validator
//! - [`mac`]           - MAC address parsing
//! - [`magic_packet`]  - Wake-on-LAN wire format
//! - [`wol`]           - one-shot UDP broadcast
//! - [`error`]         - error taxonomy

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod mac;
pub mod magic_packet;
pub mod race;
pub mod settings;
pub mod state;
pub mod wol;

pub use endpoint::Endpoint;
pub use error::{ConfigError, EndpointError, Operation};
pub use mac::{MacAddress, MacAddressError};
pub use magic_packet::MagicPacket;
pub use settings::{SettingsError, SocketSettings};
pub use state::ConnectionState;
