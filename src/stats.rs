//! Filter statistics tracking
//!
//! This module provides observability counters for the packet-to-verdict
//! pipeline. Counters use relaxed atomics only: the receive loop is
//! single-threaded and the atomics exist so a shared handle can read a
//! consistent final snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic pipeline statistics
#[derive(Debug, Default)]
pub struct FilterStats {
    /// Packets delivered by the queue subsystem
    received: AtomicU64,
    /// Packets with a Host header not on the blocklist
    allowed: AtomicU64,
    /// Packets with a blocklisted Host header
    blocked: AtomicU64,
    /// Inspectable packets without a Host header
    no_host: AtomicU64,
    /// Packets with inconsistent header-length fields
    malformed: AtomicU64,
    /// Non-IPv4/TCP packets accepted without inspection
    skipped: AtomicU64,
    /// Kernel-side queue overflow events
    overflows: AtomicU64,
}

impl FilterStats {
    /// Create new filter statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a packet delivered by the queue
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an allowed host-bearing packet
    pub fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a blocked packet
    pub fn record_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inspectable packet without a Host header
    pub fn record_no_host(&self) {
        self.no_host.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed packet accepted without inspection
    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a non-IPv4/TCP packet accepted without inspection
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a kernel-side queue overflow event
    pub fn record_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// Get packets received
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Get allowed host-bearing packets
    #[must_use]
    pub fn allowed(&self) -> u64 {
        self.allowed.load(Ordering::Relaxed)
    }

    /// Get blocked packets
    #[must_use]
    pub fn blocked(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }

    /// Get packets without a Host header
    #[must_use]
    pub fn no_host(&self) -> u64 {
        self.no_host.load(Ordering::Relaxed)
    }

    /// Get malformed packets
    #[must_use]
    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Get non-IPv4/TCP packets
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Get overflow events
    #[must_use]
    pub fn overflows(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received(),
            allowed: self.allowed(),
            blocked: self.blocked(),
            no_host: self.no_host(),
            malformed: self.malformed(),
            skipped: self.skipped(),
            overflows: self.overflows(),
        }
    }
}

/// Snapshot of pipeline statistics at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Packets delivered by the queue subsystem
    pub received: u64,
    /// Allowed host-bearing packets
    pub allowed: u64,
    /// Blocked packets
    pub blocked: u64,
    /// Inspectable packets without a Host header
    pub no_host: u64,
    /// Malformed packets accepted without inspection
    pub malformed: u64,
    /// Non-IPv4/TCP packets accepted without inspection
    pub skipped: u64,
    /// Kernel-side queue overflow events
    pub overflows: u64,
}

impl StatsSnapshot {
    /// Packets that carried a Host header and reached the verdict engine
    #[must_use]
    pub const fn inspected(&self) -> u64 {
        self.allowed + self.blocked
    }
}
