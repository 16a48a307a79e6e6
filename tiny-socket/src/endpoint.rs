//! Public endpoint: one remote host, one connection, optional Wake-on-LAN.
//!
//! ```ignore
//! let mut endpoint = Endpoint::new("192.168.1.20", Some("aa:bb:cc:dd:ee:ff"), settings)?;
//! endpoint.wake_on_lan().await?;
//! endpoint.connect().await?;
//! let reply = endpoint.send_receive(b"PING\r").await?;
//! endpoint.disconnect().await?;
//! ```
//!
//! Stream operations take `&mut self`, so a second operation cannot start on
//! the same endpoint while one is still pending.

use crate::connection::Connection;
use crate::error::{ConfigError, EndpointError};
use crate::mac::MacAddress;
use crate::settings::SocketSettings;
use crate::state::ConnectionState;
use crate::wol;

#[derive(Debug)]
pub struct Endpoint {
    host: String,
    mac_address: Option<MacAddress>,
    settings: SocketSettings,
    connection: Connection,
}

impl Endpoint {
    /// Validate `settings` and `mac_address`, then build an idle endpoint.
    pub fn new(
        host: impl Into<String>,
        mac_address: Option<&str>,
        settings: SocketSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mac_address = mac_address.map(str::parse::<MacAddress>).transpose()?;
        let connection = Connection::new(settings.timeout());
        Ok(Self {
            host: host.into(),
            mac_address,
            settings,
            connection,
        })
    }

    /// [`Endpoint::new`] with [`SocketSettings::default`].
    pub fn with_defaults(
        host: impl Into<String>,
        mac_address: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::new(host, mac_address, SocketSettings::default())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn mac_address(&self) -> Option<&MacAddress> {
        self.mac_address.as_ref()
    }

    pub fn settings(&self) -> &SocketSettings {
        &self.settings
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub async fn connect(&mut self) -> Result<(), EndpointError> {
        log::debug!("[endpoint] connecting to {}:{}", self.host, self.settings.network_port);
        self.connection
            .connect(&self.host, self.settings.network_port)
            .await
    }

    pub async fn read(&mut self) -> Result<Vec<u8>, EndpointError> {
        self.connection.read().await
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        self.connection.write(data).await
    }

    /// Write `data`, then read one response chunk.
    ///
    /// The read starts only after the write has completed; a failed write is
    /// returned as-is and no read is attempted.
    pub async fn send_receive(&mut self, data: &[u8]) -> Result<Vec<u8>, EndpointError> {
        self.write(data).await?;
        self.read().await
    }

    pub async fn disconnect(&mut self) -> Result<(), EndpointError> {
        self.connection.disconnect().await
    }

    /// Broadcast a magic packet for the configured MAC address.
    ///
    /// Independent of the stream connection: works before `connect` and after
    /// `disconnect`.
    pub async fn wake_on_lan(&self) -> Result<(), EndpointError> {
        let mac = self.mac_address.ok_or(EndpointError::MacNotConfigured)?;
        let target = self.settings.wol_target().map_err(|e| {
            EndpointError::WakeOnLan(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;
        wol::send_magic_packet(&mac, target)
            .await
            .map_err(EndpointError::WakeOnLan)
    }
}
