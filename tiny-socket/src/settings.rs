//! Connection and Wake-on-LAN settings.
//!
//! [`SocketSettings`] is validated exactly once, when an
//! [`crate::endpoint::Endpoint`] is built from it.  An invalid record never
//! reaches the network layer.

use std::net::{IpAddr, SocketAddr, SocketAddrV6};
use std::time::Duration;

use thiserror::Error;

/// Default TCP port of the remote service.
pub const DEFAULT_NETWORK_PORT: u16 = 9090;

/// Default per-operation timeout in milliseconds.
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 5_000;

/// Default Wake-on-LAN target: the IPv4 limited broadcast address.
pub const DEFAULT_WOL_ADDRESS: &str = "255.255.255.255";

/// Default Wake-on-LAN UDP port (discard service).
pub const DEFAULT_WOL_PORT: u16 = 9;

/// Separates an IPv6 literal from its zone, as in `ff02::1%eth0`.
const ZONE_SEPARATOR: char = '%';

/// Settings shared by every operation of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSettings {
    /// TCP port to connect to.
    pub network_port: u16,
    /// Timeout for each stream operation, in milliseconds.
    pub network_timeout: u64,
    /// Broadcast address (IPv4 or IPv6 literal) for magic packets.  An IPv6
    /// literal may carry a `%zone` suffix naming the outgoing interface, either
    /// by index (`fe80::1%2`) or by name (`ff02::1%eth0`).
    pub network_wol_address: String,
    /// UDP port for magic packets.
    pub network_wol_port: u16,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            network_port: DEFAULT_NETWORK_PORT,
            network_timeout: DEFAULT_NETWORK_TIMEOUT_MS,
            network_wol_address: DEFAULT_WOL_ADDRESS.to_string(),
            network_wol_port: DEFAULT_WOL_PORT,
        }
    }
}

/// A settings field that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings.network_port must be greater than 0")]
    NetworkPort,
    #[error("settings.network_timeout must be greater than 0")]
    NetworkTimeout,
    #[error("settings.network_wol_address must not be empty")]
    EmptyWolAddress,
    #[error("settings.network_wol_address must be a valid IPv4 or IPv6 address, got {0:?}")]
    InvalidWolAddress(String),
    #[error("settings.network_wol_port must be greater than 0")]
    NetworkWolPort,
    #[error("settings.network_wol_address zone {0:?} does not name a network interface")]
    UnknownZone(String),
}

impl SocketSettings {
    /// Check every field, reporting the first one that is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.network_port == 0 {
            return Err(SettingsError::NetworkPort);
        }
        if self.network_timeout == 0 {
            return Err(SettingsError::NetworkTimeout);
        }
        if self.network_wol_address.is_empty() {
            return Err(SettingsError::EmptyWolAddress);
        }
        self.wol_ip()?;
        if self.network_wol_port == 0 {
            return Err(SettingsError::NetworkWolPort);
        }
        Ok(())
    }

    /// The per-operation timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout)
    }

    /// The parsed Wake-on-LAN address, without its zone.
    pub fn wol_ip(&self) -> Result<IpAddr, SettingsError> {
        split_zone(&self.network_wol_address).map(|(ip, _)| ip)
    }

    /// Destination for magic packets: `(network_wol_address, network_wol_port)`.
    ///
    /// A zone is resolved to the interface index carried in the IPv6
    /// `scope_id`; interface names are looked up here, not in [`validate`].
    ///
    /// [`validate`]: SocketSettings::validate
    pub fn wol_target(&self) -> Result<SocketAddr, SettingsError> {
        match split_zone(&self.network_wol_address)? {
            (IpAddr::V6(ip), Some(zone)) => {
                let scope_id =
                    zone_index(zone).ok_or_else(|| SettingsError::UnknownZone(zone.to_string()))?;
                Ok(SocketAddrV6::new(ip, self.network_wol_port, 0, scope_id).into())
            }
            (ip, _) => Ok(SocketAddr::new(ip, self.network_wol_port)),
        }
    }
}

/// Split `addr` into its IP literal and optional zone.
///
/// Zones are only valid on IPv6 literals and must be non-empty.
fn split_zone(addr: &str) -> Result<(IpAddr, Option<&str>), SettingsError> {
    let invalid = || SettingsError::InvalidWolAddress(addr.to_string());
    let (literal, zone) = match addr.split_once(ZONE_SEPARATOR) {
        Some((literal, zone)) => (literal, Some(zone)),
        None => (addr, None),
    };
    let ip: IpAddr = literal.parse().map_err(|_| invalid())?;
    match zone {
        Some(zone) if ip.is_ipv4() || zone.is_empty() || zone.contains(ZONE_SEPARATOR) => {
            Err(invalid())
        }
        _ => Ok((ip, zone)),
    }
}

/// Numeric zones are taken as the interface index; names are resolved.
fn zone_index(zone: &str) -> Option<u32> {
    zone.parse().ok().or_else(|| interface_index(zone))
}

#[cfg(unix)]
fn interface_index(name: &str) -> Option<u32> {
    let name = std::ffi::CString::new(name).ok()?;
    // SAFETY: `name` is a NUL-terminated string that outlives the call.
    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    (index != 0).then_some(index)
}

#[cfg(not(unix))]
fn interface_index(_name: &str) -> Option<u32> {
    None
}
