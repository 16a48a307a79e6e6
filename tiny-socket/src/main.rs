//! Entry point for `tiny-socket`.
//!
//! Parses CLI arguments and dispatches into either **send** or **wake** mode.
//! All protocol work is delegated to the library; `main.rs` owns only process
//! setup (logging, argument parsing, settings assembly).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tiny_socket::settings::{
    DEFAULT_NETWORK_PORT, DEFAULT_NETWORK_TIMEOUT_MS, DEFAULT_WOL_ADDRESS, DEFAULT_WOL_PORT,
};
use tiny_socket::{Endpoint, SocketSettings};

/// Timeout-bounded TCP request/response client with Wake-on-LAN.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Connect, send one hex-encoded request, print the response as hex.
    Send {
        /// Remote host name or IP address.
        #[arg(long, env = "TINY_SOCKET_HOST")]
        host: String,
        /// Remote TCP port.
        #[arg(short, long, env = "TINY_SOCKET_PORT", default_value_t = DEFAULT_NETWORK_PORT)]
        port: u16,
        /// Per-operation timeout in milliseconds.
        #[arg(short, long, env = "TINY_SOCKET_TIMEOUT", default_value_t = DEFAULT_NETWORK_TIMEOUT_MS)]
        timeout: u64,
        /// Request payload as hex, e.g. "01 02 ff".
        payload: String,
    },
    /// Broadcast a Wake-on-LAN magic packet.
    Wake {
        /// Target MAC address (aa:bb:cc:dd:ee:ff).
        #[arg(short, long, env = "TINY_SOCKET_MAC")]
        mac: String,
        /// Broadcast address (IPv4 or IPv6 literal).
        #[arg(long, env = "TINY_SOCKET_WOL_ADDRESS", default_value = DEFAULT_WOL_ADDRESS)]
        wol_address: String,
        /// Broadcast UDP port.
        #[arg(long, env = "TINY_SOCKET_WOL_PORT", default_value_t = DEFAULT_WOL_PORT)]
        wol_port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Send {
            host,
            port,
            timeout,
            payload,
        } => {
            let request = parse_hex(&payload)?;
            let settings = SocketSettings {
                network_port: port,
                network_timeout: timeout,
                ..SocketSettings::default()
            };
            let mut endpoint =
                Endpoint::new(host, None, settings).context("invalid endpoint configuration")?;

            log::info!("Sending {} byte(s) to {}:{port}", request.len(), endpoint.host());
            endpoint.connect().await.context("connect failed")?;
            let response = endpoint
                .send_receive(&request)
                .await
                .context("request failed")?;
            endpoint.disconnect().await.context("disconnect failed")?;

            println!("{}", to_hex(&response));
        }
        Mode::Wake {
            mac,
            wol_address,
            wol_port,
        } => {
            let settings = SocketSettings {
                network_wol_address: wol_address,
                network_wol_port: wol_port,
                ..SocketSettings::default()
            };
            let endpoint = Endpoint::new("localhost", Some(mac.as_str()), settings)
                .context("invalid wake-on-lan configuration")?;

            log::info!(
                "Waking {mac} via {}:{wol_port}",
                endpoint.settings().network_wol_address
            );
            endpoint.wake_on_lan().await.context("wake on lan failed")?;
        }
    }

    Ok(())
}

/// Decode pairs of hex digits, ignoring whitespace between them.
fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if let Some(bad) = digits.iter().find(|b| !b.is_ascii_hexdigit()) {
        bail!("invalid hex digit {:?} in payload", char::from(*bad));
    }
    if digits.len() % 2 != 0 {
        bail!("hex payload must have an even number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("hex payload is not ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte {pair:?}"))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
