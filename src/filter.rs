//! Host filtering pipeline and verdict engine
//!
//! This module maps one raw packet buffer to one [`Verdict`]. The pipeline
//! is parser → extractor → decision, composed behind the [`PacketHandler`]
//! trait so the loop driver stays decoupled from the transport and the
//! whole pipeline can be exercised with synthetic packets.
//!
//! The verdict is a value returned per call. Nothing about a packet
//! persists into the next invocation.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::blocklist::BlockList;
use crate::packet::PacketView;
use crate::sniff;
use crate::stats::FilterStats;

/// Accept/drop decision for one intercepted packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Let the packet pass
    Accept,
    /// Discard the packet
    Drop,
}

impl Verdict {
    /// Check if this verdict drops the packet
    #[must_use]
    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }

    /// Get the verdict name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Drop => "drop",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A packet inspector that makes accept/drop decisions
///
/// The loop driver invokes `handle` once per delivered packet and submits
/// the returned verdict before the next receive. Implementations must not
/// carry per-packet state across calls.
pub trait PacketHandler {
    /// Map one raw packet buffer to a verdict
    fn handle(&self, packet: &[u8]) -> Verdict;

    /// Called when the kernel reports a recoverable queue overflow
    ///
    /// No packet accompanies the notification; the default does nothing.
    fn on_overflow(&self) {}
}

/// Map an extracted hostname to a verdict
///
/// - absent host → [`Verdict::Accept`]
/// - host on the blocklist → [`Verdict::Drop`], block event emitted
/// - host not on the blocklist → [`Verdict::Accept`], allow event emitted
///
/// # Example
///
/// ```
/// use hostblock::blocklist::BlockList;
/// use hostblock::filter::{decide, Verdict};
///
/// let list: BlockList = ["example.com"].into_iter().collect();
/// assert_eq!(decide(Some("example.com"), &list), Verdict::Drop);
/// assert_eq!(decide(Some("other.org"), &list), Verdict::Accept);
/// assert_eq!(decide(None, &list), Verdict::Accept);
/// ```
#[must_use]
pub fn decide(host: Option<&str>, blocklist: &BlockList) -> Verdict {
    match host {
        None => Verdict::Accept,
        Some(host) if blocklist.contains(host) => {
            info!("Blocked host: {}", host);
            Verdict::Drop
        }
        Some(host) => {
            info!("Allowed host: {}", host);
            Verdict::Accept
        }
    }
}

/// Host-header blocking filter
///
/// Owns the immutable blocklist and the pipeline counters. The safe
/// default on any per-packet ambiguity is to accept: malformed headers and
/// non-IPv4/TCP packets pass without inspection.
#[derive(Debug)]
pub struct HostFilter {
    blocklist: BlockList,
    stats: Arc<FilterStats>,
}

impl HostFilter {
    /// Create a filter over a loaded blocklist
    #[must_use]
    pub fn new(blocklist: BlockList) -> Self {
        Self {
            blocklist,
            stats: Arc::new(FilterStats::new()),
        }
    }

    /// Shared handle to the pipeline counters
    #[must_use]
    pub fn stats(&self) -> Arc<FilterStats> {
        Arc::clone(&self.stats)
    }

    /// The blocklist this filter consults
    #[must_use]
    pub fn blocklist(&self) -> &BlockList {
        &self.blocklist
    }
}

impl PacketHandler for HostFilter {
    fn handle(&self, packet: &[u8]) -> Verdict {
        self.stats.record_received();

        let view = match PacketView::parse(packet) {
            Ok(Some(view)) => view,
            Ok(None) => {
                trace!("Not IPv4/TCP, accepting without inspection");
                self.stats.record_skipped();
                return Verdict::Accept;
            }
            Err(e) => {
                debug!("Accepting malformed packet without inspection: {}", e);
                self.stats.record_malformed();
                return Verdict::Accept;
            }
        };

        match sniff::extract_host(view.payload()) {
            None => {
                trace!("No Host header in {} payload bytes, accepting", view.payload_len());
                self.stats.record_no_host();
                Verdict::Accept
            }
            host @ Some(_) => {
                let verdict = decide(host, &self.blocklist);
                if verdict.is_drop() {
                    self.stats.record_blocked();
                } else {
                    self.stats.record_allowed();
                }
                verdict
            }
        }
    }

    fn on_overflow(&self) {
        self.stats.record_overflow();
    }
}
