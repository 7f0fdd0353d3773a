//! hostblock: NFQUEUE-based HTTP Host header domain blocker
//!
//! This crate intercepts IPv4 packets from a netfilter queue, inspects the
//! TCP payload for an HTTP `Host` header, and drops packets whose hostname
//! appears on a preloaded blocklist. Everything else passes: the filter
//! fails open on malformed headers, missing Host lines, and non-IPv4/TCP
//! traffic.
//!
//! # Architecture
//!
//! ```text
//! kernel → QueueLoop.recv → PacketView → extract_host → decide (BlockList)
//!                                                          ↓
//! kernel ← QueueLoop.verdict ←──────────────────────── Verdict
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use hostblock::blocklist::BlockList;
//! use hostblock::filter::HostFilter;
//! use hostblock::queue::{QueueConfig, QueueLoop};
//!
//! # fn example() -> Result<(), hostblock::AppError> {
//! // Load the blocklist
//! let blocklist = BlockList::load("top-1m.txt")?;
//!
//! // Build the pipeline and bind the queue
//! let filter = HostFilter::new(blocklist);
//! let mut queue = QueueLoop::open(QueueConfig::default())?;
//!
//! // Runs until a fatal transport error
//! queue.run(&filter)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`blocklist`]: Blocklist loading and membership queries
//! - [`error`]: Error types and exit-code mapping
//! - [`filter`]: Verdict engine and packet handler pipeline
//! - [`packet`]: IPv4/TCP header derivation
//! - [`queue`]: NFQUEUE receive loop driver
//! - [`sniff`]: HTTP Host header extraction
//! - [`stats`]: Pipeline observability counters

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod blocklist;
pub mod error;
pub mod filter;
pub mod packet;
pub mod queue;
pub mod sniff;
pub mod stats;

// Re-export commonly used types at the crate root
pub use blocklist::BlockList;
pub use error::{AppError, BlocklistError, PacketError, QueueError};
pub use filter::{decide, HostFilter, PacketHandler, Verdict};
pub use packet::PacketView;
pub use queue::{QueueConfig, QueueLoop};
pub use stats::{FilterStats, StatsSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
