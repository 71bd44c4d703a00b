//! Wake-on-LAN magic packets.

use std::fmt;
use std::str::FromStr;

use tokio::net::UdpSocket;

use crate::error::Error;

pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;
pub const DEFAULT_BROADCAST: &str = "255.255.255.255";
pub const DEFAULT_PORT: u16 = 9;

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    /// Accepts `AA:BB:CC:DD:EE:FF`, `aa-bb-cc-dd-ee-ff` or `aabbccddeeff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMacAddress(s.to_string());
        let hex: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-'))
            .collect();
        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let pair = hex.get(i * 2..i * 2 + 2).ok_or_else(invalid)?;
            *octet = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Six `0xFF` bytes followed by the address repeated sixteen times.
pub fn magic_packet(mac: &MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFF; MAGIC_PACKET_LEN];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac.0);
    }
    packet
}

/// Where to broadcast the magic packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeTarget {
    pub mac: MacAddress,
    pub broadcast: String,
    pub port: u16,
}

impl WakeTarget {
    pub fn new(mac: MacAddress) -> Self {
        Self {
            mac,
            broadcast: DEFAULT_BROADCAST.into(),
            port: DEFAULT_PORT,
        }
    }
}

/// Broadcast the magic packet for `target` over UDP.
pub async fn send_magic_packet(target: &WakeTarget) -> Result<(), Error> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .await
        .map_err(Error::WakeOnLan)?;
    socket.set_broadcast(true).map_err(Error::WakeOnLan)?;

    let packet = magic_packet(&target.mac);
    let sent = socket
        .send_to(&packet, (target.broadcast.as_str(), target.port))
        .await
        .map_err(Error::WakeOnLan)?;

    tracing::debug!(
        mac = %target.mac,
        broadcast = %target.broadcast,
        port = target.port,
        bytes = sent,
        "magic packet sent"
    );
    Ok(())
}
