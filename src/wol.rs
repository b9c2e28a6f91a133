//! Wake-on-LAN magic packet encoder and sender.
//!
//! A magic packet is 6 bytes of `0xFF` followed by the target MAC
//! address repeated 16 times, 102 bytes in total, broadcast as UDP to
//! port 9. Building the packet is pure and total; only the send can
//! fail, and a failed send is reported, never retried.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::info;

/// Standard Wake-on-LAN UDP port.
pub const WOL_PORT: u16 = 9;

/// Magic packet size: 6-byte header + 16 repetitions of a 6-byte MAC.
pub const MAGIC_PACKET_LEN: usize = 102;

/// Error for parsing a [`MacAddr`] from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMacError {
    #[error("expected 17 characters (XX-XX-XX-XX-XX-XX), got {0}")]
    InvalidLength(usize),
    #[error("expected '-' separators between byte pairs")]
    InvalidSeparator,
    #[error("invalid hex byte pair: {0:?}")]
    InvalidHexPair(String),
}

/// A six-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl FromStr for MacAddr {
    type Err = ParseMacError;

    /// Accepts exactly the 17-character hyphenated form
    /// `XX-XX-XX-XX-XX-XX` (case-insensitive hex).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 17 {
            return Err(ParseMacError::InvalidLength(s.len()));
        }
        let bytes = s.as_bytes();
        let mut mac = [0u8; 6];
        for (i, octet) in mac.iter_mut().enumerate() {
            if i > 0 && bytes[i * 3 - 1] != b'-' {
                return Err(ParseMacError::InvalidSeparator);
            }
            let pair = &bytes[i * 3..i * 3 + 2];
            let hex = |b: u8| (b as char).to_digit(16).map(|v| v as u8);
            match (hex(pair[0]), hex(pair[1])) {
                (Some(hi), Some(lo)) => *octet = (hi << 4) | lo,
                _ => {
                    return Err(ParseMacError::InvalidHexPair(
                        String::from_utf8_lossy(pair).into_owned(),
                    ))
                }
            }
        }
        Ok(MacAddr(mac))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}-{b:02X}-{c:02X}-{d:02X}-{e:02X}-{g:02X}")
    }
}

/// Build the 102-byte magic packet for `mac`. Pure and total.
pub fn magic_packet(mac: MacAddr) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for rep in 0..16 {
        packet[6 + rep * 6..6 + (rep + 1) * 6].copy_from_slice(&mac.0);
    }
    packet
}

/// Error from sending a magic packet.
#[derive(Debug, Error)]
pub enum WolError {
    #[error("invalid MAC address: {0}")]
    Mac(#[from] ParseMacError),
    #[error("magic packet send failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Broadcast the magic packet for `mac` to the limited broadcast
/// address on port 9. The socket lives for exactly one send.
pub async fn send_magic_packet(mac: MacAddr) -> Result<(), WolError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    let packet = magic_packet(mac);
    socket.send_to(&packet, (Ipv4Addr::BROADCAST, WOL_PORT)).await?;
    info!("sent WoL packet to {mac}");
    Ok(())
}
