//! Error types for hostblock
//!
//! This module defines the error hierarchy for the host-header blocker.
//! Errors are categorized by subsystem: blocklist loading, per-packet
//! parsing, and the queue transport. Setup failures map to distinct
//! process exit codes so the operator can tell failure classes apart.

use std::io;

use thiserror::Error;

/// Top-level error type for hostblock
#[derive(Debug, Error)]
pub enum AppError {
    /// Blocklist loading errors (file access, parsing)
    #[error("Blocklist error: {0}")]
    Blocklist(#[from] BlocklistError),

    /// Queue transport errors (setup and receive)
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl AppError {
    /// Process exit code for this error
    ///
    /// Each setup failure class gets its own code so scripts wrapping the
    /// binary can distinguish them:
    ///
    /// - 10: blocklist file unreadable or unparseable
    /// - 11: queue handle open failure
    /// - 12: queue bind failure
    /// - 13: packet-copy mode failure
    /// - 1: fatal receive or verdict-submission error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Blocklist(_) => 10,
            Self::Queue(e) => match e {
                QueueError::Open(_) => 11,
                QueueError::Bind { .. } => 12,
                QueueError::CopyMode { .. } => 13,
                QueueError::Recv(_) | QueueError::Verdict(_) => 1,
            },
        }
    }
}

/// Blocklist loading errors
///
/// These are always fatal at startup; the filter never runs without a
/// loaded blocklist.
#[derive(Debug, Error)]
pub enum BlocklistError {
    /// File not found or inaccessible
    #[error("Blocklist file not found: {path}")]
    FileNotFound { path: String },

    /// I/O error while reading the file
    #[error("I/O error reading blocklist: {0}")]
    Io(#[from] io::Error),
}

impl BlocklistError {
    /// Blocklist errors are never recoverable; startup aborts
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}

/// Per-packet parsing errors
///
/// Header-length fields are derived from attacker-controlled bytes; any
/// inconsistency between them and the buffer length surfaces here. These
/// errors are always contained within the packet handler: the packet is
/// accepted without inspection and the loop continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// Buffer shorter than a derived header offset requires
    #[error("Packet truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },

    /// IPv4 header-length field below the 20-byte minimum
    #[error("IPv4 header length {len} below 20-byte minimum")]
    IpHeaderTooShort { len: usize },

    /// TCP data-offset field below the 20-byte minimum
    #[error("TCP header length {len} below 20-byte minimum")]
    TcpHeaderTooShort { len: usize },
}

impl PacketError {
    /// Malformed packets never terminate the loop
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        true
    }
}

/// Queue transport errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Failed to open the netfilter queue handle
    #[error("Failed to open netfilter queue handle: {0}")]
    Open(#[source] io::Error),

    /// Failed to bind the queue number
    #[error("Failed to bind queue {queue_num}: {source}")]
    Bind {
        queue_num: u16,
        #[source]
        source: io::Error,
    },

    /// Failed to set the packet-copy range
    #[error("Failed to set copy range on queue {queue_num}: {source}")]
    CopyMode {
        queue_num: u16,
        #[source]
        source: io::Error,
    },

    /// Receive failure on the queue socket
    #[error("Receive error: {0}")]
    Recv(#[source] io::Error),

    /// Verdict submission failure
    #[error("Verdict submission error: {0}")]
    Verdict(#[source] io::Error),
}

impl QueueError {
    /// Check if this error is recoverable
    ///
    /// ENOBUFS on receive means the kernel-side queue overflowed because
    /// packets arrive faster than they are drained; the loop keeps
    /// receiving. Every other transport error is fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Recv(e) => e.raw_os_error() == Some(libc::ENOBUFS),
            Self::Open(_) | Self::Bind { .. } | Self::CopyMode { .. } | Self::Verdict(_) => false,
        }
    }

    /// Create a bind error
    pub fn bind(queue_num: u16, source: io::Error) -> Self {
        Self::Bind { queue_num, source }
    }

    /// Create a copy-mode error
    pub fn copy_mode(queue_num: u16, source: io::Error) -> Self {
        Self::CopyMode { queue_num, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enobufs() -> io::Error {
        io::Error::from_raw_os_error(libc::ENOBUFS)
    }

    #[test]
    fn test_overflow_is_recoverable() {
        let err = QueueError::Recv(enobufs());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_other_recv_errors_are_fatal() {
        let err = QueueError::Recv(io::Error::new(io::ErrorKind::Other, "netlink failure"));
        assert!(!err.is_recoverable());

        let err = QueueError::Recv(io::Error::from_raw_os_error(libc::EINTR));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_setup_errors_are_fatal() {
        assert!(!QueueError::Open(enobufs()).is_recoverable());
        assert!(!QueueError::bind(0, enobufs()).is_recoverable());
        assert!(!QueueError::copy_mode(0, enobufs()).is_recoverable());
        assert!(!QueueError::Verdict(enobufs()).is_recoverable());
    }

    #[test]
    fn test_packet_errors_are_recoverable() {
        assert!(PacketError::Truncated { needed: 20, len: 4 }.is_recoverable());
        assert!(PacketError::IpHeaderTooShort { len: 8 }.is_recoverable());
        assert!(PacketError::TcpHeaderTooShort { len: 12 }.is_recoverable());
    }

    #[test]
    fn test_exit_codes_are_distinct_per_setup_class() {
        let codes = [
            AppError::Blocklist(BlocklistError::FileNotFound { path: "x".into() }).exit_code(),
            AppError::Queue(QueueError::Open(enobufs())).exit_code(),
            AppError::Queue(QueueError::bind(0, enobufs())).exit_code(),
            AppError::Queue(QueueError::copy_mode(0, enobufs())).exit_code(),
            AppError::Queue(QueueError::Recv(enobufs())).exit_code(),
        ];
        for code in codes {
            assert_ne!(code, 0);
        }
        let mut unique = codes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_error_display() {
        let err = QueueError::bind(3, io::Error::new(io::ErrorKind::PermissionDenied, "EPERM"));
        assert!(err.to_string().contains("queue 3"));

        let err = PacketError::Truncated { needed: 33, len: 25 };
        assert!(err.to_string().contains("33"));
        assert!(err.to_string().contains("25"));
    }
}
