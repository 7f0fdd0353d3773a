//! IPv4/TCP header derivation over raw packet buffers
//!
//! The queue subsystem delivers packets as raw byte buffers starting at the
//! IPv4 header. This module derives the nested header lengths and exposes a
//! bounds-checked view of the TCP payload. Every offset is computed from
//! attacker-controlled bytes and validated against the buffer length before
//! any indexed read.
//!
//! ## Relevant header layout
//!
//! ```text
//! IPv4:
//!   byte 0: version (high nibble) | IHL in 32-bit words (low nibble)
//!   byte 9: protocol (6 = TCP)
//! TCP (at IHL * 4):
//!   byte 12: data offset in 32-bit words (high nibble)
//! Payload (at IHL * 4 + data offset * 4)
//! ```

use crate::error::PacketError;

/// Minimum IPv4 header length in bytes (IHL of 5 words)
const MIN_IP_HEADER_LEN: usize = 20;

/// Minimum TCP header length in bytes (data offset of 5 words)
const MIN_TCP_HEADER_LEN: usize = 20;

/// IPv4 protocol number for TCP
const IP_PROTO_TCP: u8 = 6;

/// Offset of the protocol field within the IPv4 header
const IP_PROTOCOL_OFFSET: usize = 9;

/// Offset of the data-offset byte within the TCP header
const TCP_DATA_OFFSET_OFFSET: usize = 12;

/// Bounds-checked view of one packet's header and payload regions
///
/// Borrowed from the receive buffer; lives only for the duration of one
/// handler invocation. A zero-length payload (a bare ACK, or a packet whose
/// headers consume the whole buffer) is a valid view, not an error.
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    buf: &'a [u8],
    ip_header_len: usize,
    tcp_header_len: usize,
    payload_offset: usize,
    payload_len: usize,
}

impl<'a> PacketView<'a> {
    /// Derive header lengths from a raw IPv4 buffer
    ///
    /// Returns `Ok(None)` for packets that are not IPv4/TCP; those carry no
    /// HTTP payload to inspect and short-circuit to an accept verdict
    /// without any further offset arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `PacketError` when a header-length field is inconsistent
    /// with the buffer: the buffer is shorter than a derived offset
    /// requires, or a length field is below its protocol minimum.
    ///
    /// # Example
    ///
    /// ```
    /// use hostblock::packet::PacketView;
    ///
    /// let mut packet = vec![0u8; 40];
    /// packet[0] = 0x45; // IPv4, 20-byte header
    /// packet[9] = 6; // TCP
    /// packet[32] = 0x50; // 20-byte TCP header
    /// let view = PacketView::parse(&packet).unwrap().unwrap();
    /// assert_eq!(view.payload_len(), 0);
    /// ```
    pub fn parse(buf: &'a [u8]) -> Result<Option<Self>, PacketError> {
        if buf.len() < MIN_IP_HEADER_LEN {
            return Err(PacketError::Truncated {
                needed: MIN_IP_HEADER_LEN,
                len: buf.len(),
            });
        }

        // Version and protocol are validated before any derived offset is
        // trusted; non-IPv4/TCP packets are not inspectable.
        if buf[0] >> 4 != 4 {
            return Ok(None);
        }

        let ip_header_len = usize::from(buf[0] & 0x0f) * 4;
        if ip_header_len < MIN_IP_HEADER_LEN {
            return Err(PacketError::IpHeaderTooShort { len: ip_header_len });
        }
        if buf.len() < ip_header_len {
            return Err(PacketError::Truncated {
                needed: ip_header_len,
                len: buf.len(),
            });
        }

        if buf[IP_PROTOCOL_OFFSET] != IP_PROTO_TCP {
            return Ok(None);
        }

        let data_offset_index = ip_header_len + TCP_DATA_OFFSET_OFFSET;
        let Some(&data_offset_byte) = buf.get(data_offset_index) else {
            return Err(PacketError::Truncated {
                needed: data_offset_index + 1,
                len: buf.len(),
            });
        };

        let tcp_header_len = usize::from(data_offset_byte >> 4) * 4;
        if tcp_header_len < MIN_TCP_HEADER_LEN {
            return Err(PacketError::TcpHeaderTooShort { len: tcp_header_len });
        }

        // Headers consuming the whole buffer leave an empty payload; that is
        // a data-less segment, not a malformed packet.
        let payload_offset = ip_header_len + tcp_header_len;
        let payload_len = buf.len().saturating_sub(payload_offset);

        Ok(Some(Self {
            buf,
            ip_header_len,
            tcp_header_len,
            payload_offset,
            payload_len,
        }))
    }

    /// The application payload region
    ///
    /// Empty when the packet carries no application data. Never extends
    /// past the receive buffer.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        if self.payload_len == 0 {
            &[]
        } else {
            &self.buf[self.payload_offset..self.payload_offset + self.payload_len]
        }
    }

    /// Derived IPv4 header length in bytes
    #[must_use]
    pub const fn ip_header_len(&self) -> usize {
        self.ip_header_len
    }

    /// Derived TCP header length in bytes
    #[must_use]
    pub const fn tcp_header_len(&self) -> usize {
        self.tcp_header_len
    }

    /// Offset of the payload within the receive buffer
    #[must_use]
    pub const fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// Payload length in bytes
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.payload_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an IPv4/TCP packet with the given header word counts.
    fn packet(ip_words: u8, tcp_words: u8, payload: &[u8]) -> Vec<u8> {
        let ip_len = usize::from(ip_words) * 4;
        let tcp_len = usize::from(tcp_words) * 4;
        let mut buf = vec![0u8; ip_len + tcp_len + payload.len()];
        buf[0] = 0x40 | ip_words;
        buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;
        buf[ip_len + TCP_DATA_OFFSET_OFFSET] = tcp_words << 4;
        buf[ip_len + tcp_len..].copy_from_slice(payload);
        buf
    }

    #[test]
    fn test_parse_minimal_headers() {
        let buf = packet(5, 5, b"GET / HTTP/1.1\r\n");
        let view = PacketView::parse(&buf).unwrap().unwrap();

        assert_eq!(view.ip_header_len(), 20);
        assert_eq!(view.tcp_header_len(), 20);
        assert_eq!(view.payload_offset(), 40);
        assert_eq!(view.payload(), b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn test_parse_with_options() {
        // IP options (IHL 7) and TCP options (data offset 8)
        let buf = packet(7, 8, b"payload");
        let view = PacketView::parse(&buf).unwrap().unwrap();

        assert_eq!(view.ip_header_len(), 28);
        assert_eq!(view.tcp_header_len(), 32);
        assert_eq!(view.payload(), b"payload");
    }

    #[test]
    fn test_parse_empty_payload_is_not_an_error() {
        let buf = packet(5, 5, b"");
        let view = PacketView::parse(&buf).unwrap().unwrap();

        assert_eq!(view.payload_len(), 0);
        assert!(view.payload().is_empty());
    }

    #[test]
    fn test_parse_headers_past_buffer_end_yield_empty_payload() {
        // TCP data offset claims 60 bytes but the buffer ends at the
        // minimal header; the payload region is empty, not out of bounds.
        let mut buf = packet(5, 5, b"");
        buf[20 + TCP_DATA_OFFSET_OFFSET] = 0xf0;
        let view = PacketView::parse(&buf).unwrap().unwrap();

        assert_eq!(view.tcp_header_len(), 60);
        assert_eq!(view.payload_len(), 0);
        assert!(view.payload().is_empty());
    }

    #[test]
    fn test_parse_non_ipv4_short_circuits() {
        let mut buf = packet(5, 5, b"data");
        buf[0] = 0x65; // version 6
        assert!(PacketView::parse(&buf).unwrap().is_none());
    }

    #[test]
    fn test_parse_non_tcp_short_circuits() {
        let mut buf = packet(5, 5, b"data");
        buf[IP_PROTOCOL_OFFSET] = 17; // UDP
        assert!(PacketView::parse(&buf).unwrap().is_none());
    }

    #[test]
    fn test_parse_ip_header_longer_than_buffer() {
        // IHL claims 60 bytes, buffer holds 20
        let mut buf = vec![0u8; 20];
        buf[0] = 0x4f;
        buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;

        assert_eq!(
            PacketView::parse(&buf).unwrap_err(),
            PacketError::Truncated { needed: 60, len: 20 }
        );
    }

    #[test]
    fn test_parse_ip_header_below_minimum() {
        let mut buf = vec![0u8; 40];
        buf[0] = 0x42; // IHL 2 words = 8 bytes
        buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;

        assert_eq!(
            PacketView::parse(&buf).unwrap_err(),
            PacketError::IpHeaderTooShort { len: 8 }
        );
    }

    #[test]
    fn test_parse_tcp_data_offset_below_minimum() {
        let mut buf = packet(5, 5, b"");
        buf[20 + TCP_DATA_OFFSET_OFFSET] = 0x30; // 3 words = 12 bytes

        assert_eq!(
            PacketView::parse(&buf).unwrap_err(),
            PacketError::TcpHeaderTooShort { len: 12 }
        );
    }

    #[test]
    fn test_parse_buffer_too_short_for_data_offset_byte() {
        // 20-byte IPv4 header only; the TCP data-offset byte at 32 is
        // outside the buffer
        let mut buf = vec![0u8; 24];
        buf[0] = 0x45;
        buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;

        assert_eq!(
            PacketView::parse(&buf).unwrap_err(),
            PacketError::Truncated { needed: 33, len: 24 }
        );
    }

    #[test]
    fn test_parse_short_buffers() {
        for len in 0..MIN_IP_HEADER_LEN {
            let buf = vec![0x45u8; len];
            assert_eq!(
                PacketView::parse(&buf).unwrap_err(),
                PacketError::Truncated {
                    needed: MIN_IP_HEADER_LEN,
                    len
                }
            );
        }
    }

    /// Exhaustive sweep over short buffer lengths and first-byte values
    /// with all other bytes maximal: parse must never index outside the
    /// buffer (an out-of-bounds read would panic the test).
    #[test]
    fn test_parse_never_reads_out_of_bounds() {
        for len in 0..=96 {
            for first in 0..=u8::MAX {
                let mut buf = vec![0xffu8; len];
                if len > 0 {
                    buf[0] = first;
                }
                if len > IP_PROTOCOL_OFFSET {
                    buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;
                }
                let _ = PacketView::parse(&buf);
            }
        }
    }

    /// Same sweep at the maximum receive size with every data-offset
    /// position set to its maximal nibble.
    #[test]
    fn test_parse_max_size_buffer_with_maximal_offsets() {
        let mut buf = vec![0xffu8; 4096];
        for first in [0x45u8, 0x4f, 0xff, 0x00, 0x40] {
            buf[0] = first;
            buf[IP_PROTOCOL_OFFSET] = IP_PROTO_TCP;
            if let Ok(Some(view)) = PacketView::parse(&buf) {
                let payload = view.payload();
                assert!(view.payload_offset() + payload.len() <= buf.len());
            }
        }
    }
}
