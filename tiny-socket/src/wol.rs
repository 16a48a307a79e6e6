//! One-shot Wake-on-LAN transmission.
//!
//! Every call binds its own ephemeral `tokio::net::UdpSocket`, sends a single
//! [`MagicPacket`] datagram and drops the socket before returning.  Sockets are
//! never cached or shared between calls.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::mac::MacAddress;
use crate::magic_packet::{MagicPacket, MAGIC_PACKET_LEN};

/// Wildcard local address of the same family as `target`, ephemeral port.
fn local_bind_addr(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

/// Broadcast one magic packet for `mac` to `target`.
///
/// The socket lives only for the duration of this call; it is released on
/// the success path and on every error path alike.
pub async fn send_magic_packet(mac: &MacAddress, target: SocketAddr) -> io::Result<()> {
    let socket = UdpSocket::bind(local_bind_addr(&target)).await?;
    socket.set_broadcast(true)?;

    let packet = MagicPacket::new(mac);
    let sent = socket.send_to(packet.as_bytes(), target).await?;
    if sent != MAGIC_PACKET_LEN {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short magic packet send: {sent} of {MAGIC_PACKET_LEN} bytes"),
        ));
    }
    log::debug!("[wol] → magic packet for {mac} to {target}");
    Ok(())
}
