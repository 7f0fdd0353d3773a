//! Blocklist loading and membership queries
//!
//! The blocklist is a plain-text file of `<rank>,<hostname>` lines, such as
//! a top-sites ranking export. Ranks are parsed and discarded; hostnames are
//! collected into an immutable set queried once per inspected packet.
//!
//! ## Line format
//!
//! ```text
//! 1,example.com
//! 2,test.org
//! ```
//!
//! Lines longer than [`MAX_LINE_LEN`] bytes are rejected, not truncated:
//! truncating a hostname could alias it onto a different, shorter hostname
//! and block the wrong domain. Rejected lines are logged and counted.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::BlocklistError;

/// Maximum accepted blocklist line length in bytes
///
/// Longer lines are skipped with a warning.
pub const MAX_LINE_LEN: usize = 255;

/// Immutable set of blocked hostnames
///
/// Built once at startup, read-only afterward. The receive loop is
/// single-threaded, so lookups need no synchronization.
///
/// # Example
///
/// ```
/// use hostblock::blocklist::BlockList;
///
/// let list: BlockList = ["example.com", "test.org"].into_iter().collect();
/// assert!(list.contains("example.com"));
/// assert!(!list.contains("other.org"));
/// ```
#[derive(Debug, Default)]
pub struct BlockList {
    hosts: HashSet<String>,
}

impl BlockList {
    /// Load a blocklist from a `<rank>,<hostname>` file
    ///
    /// Empty lines, over-length lines, lines without a comma, lines whose
    /// rank is not an integer, and lines with an empty or non-ASCII
    /// hostname are skipped with a warning. Loading the same file twice
    /// produces identical membership.
    ///
    /// # Errors
    ///
    /// Returns `BlocklistError` if the file does not exist or cannot be
    /// read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BlocklistError> {
        let path = path.as_ref();

        debug!("Loading blocklist from {:?}", path);

        if !path.exists() {
            return Err(BlocklistError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let start = Instant::now();
        let reader = BufReader::new(File::open(path)?);

        let mut hosts = HashSet::new();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;

            if line.len() > MAX_LINE_LEN {
                warn!(
                    "Skipping blocklist line {} over {}-byte cap ({} bytes)",
                    line_no,
                    MAX_LINE_LEN,
                    line.len()
                );
                skipped += 1;
                continue;
            }

            let Some((rank, hostname)) = line.split_once(',') else {
                warn!("Skipping blocklist line {}: no rank separator", line_no);
                skipped += 1;
                continue;
            };

            if rank.trim().parse::<u64>().is_err() {
                warn!("Skipping blocklist line {}: non-integer rank {:?}", line_no, rank);
                skipped += 1;
                continue;
            }

            let hostname = hostname.trim();
            if hostname.is_empty() || !hostname.is_ascii() {
                warn!("Skipping blocklist line {}: invalid hostname", line_no);
                skipped += 1;
                continue;
            }

            hosts.insert(hostname.to_string());
        }

        info!(
            "Blocklist loaded: {} hostnames in {:.2}ms ({} lines skipped)",
            hosts.len(),
            start.elapsed().as_secs_f64() * 1000.0,
            skipped
        );

        Ok(Self { hosts })
    }

    /// Check whether a hostname is blocked
    ///
    /// Exact, case-sensitive match.
    #[must_use]
    pub fn contains(&self, hostname: &str) -> bool {
        self.hosts.contains(hostname)
    }

    /// Number of blocked hostnames
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Check if the blocklist is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BlockList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            hosts: iter.into_iter().map(Into::into).collect(),
        }
    }
}
