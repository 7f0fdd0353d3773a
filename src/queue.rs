//! NFQUEUE receive loop driver
//!
//! This module owns the netfilter queue handle and drives the blocking
//! receive loop. The transport is treated as a black box: packets arrive
//! as raw buffers, verdicts go back keyed by the message they arrived in.
//! The packet-to-verdict mapping itself is injected as a [`PacketHandler`],
//! so the loop can be pointed at any pipeline and the pipeline can be
//! tested without a live queue.
//!
//! Requires `CAP_NET_ADMIN` and an iptables rule directing traffic to the
//! queue, e.g.:
//!
//! ```text
//! iptables -A OUTPUT -p tcp --dport 80 -j NFQUEUE --queue-num 0
//! ```

use nfq::{Queue, Verdict as NfqVerdict};
use tracing::{debug, info, warn};

use crate::error::QueueError;
use crate::filter::{PacketHandler, Verdict};

/// Queue transport configuration
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// NFQUEUE number to bind (matches the iptables `--queue-num`)
    pub queue_num: u16,
    /// How many bytes of each packet the kernel copies to userspace
    pub copy_range: u16,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_num: 0,
            copy_range: 0xffff,
        }
    }
}

/// Blocking receive loop over one bound NFQUEUE
///
/// Binding happens in [`QueueLoop::open`]; unbinding and releasing the
/// handle happen on drop, so cleanup runs on every exit path including
/// error paths.
pub struct QueueLoop {
    queue: Queue,
    queue_num: u16,
}

impl QueueLoop {
    /// Open the queue subsystem and bind the configured queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Open`, `QueueError::Bind`, or
    /// `QueueError::CopyMode` depending on which setup step failed; each
    /// maps to a distinct exit code.
    pub fn open(config: QueueConfig) -> Result<Self, QueueError> {
        let mut queue = Queue::open().map_err(QueueError::Open)?;

        queue
            .bind(config.queue_num)
            .map_err(|e| QueueError::bind(config.queue_num, e))?;

        queue
            .set_copy_range(config.queue_num, config.copy_range)
            .map_err(|e| QueueError::copy_mode(config.queue_num, e))?;

        info!(
            "Bound to NFQUEUE {} (copy range {} bytes)",
            config.queue_num, config.copy_range
        );

        Ok(Self {
            queue,
            queue_num: config.queue_num,
        })
    }

    /// Queue number this loop is bound to
    #[must_use]
    pub const fn queue_num(&self) -> u16 {
        self.queue_num
    }

    /// Drive the receive loop until a fatal transport error
    ///
    /// Per delivered message: invoke the handler on the raw payload, set
    /// the verdict on the same message, and submit it before the next
    /// receive. The message carries the kernel's packet id, so the id is
    /// echoed back unmodified by construction.
    ///
    /// A recoverable overflow (kernel-side queue over capacity) is logged
    /// and counted via [`PacketHandler::on_overflow`]; the loop keeps
    /// draining without reconnecting. There is no timeout on receive and
    /// no other suspension point.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Recv` or `QueueError::Verdict` on any
    /// non-recoverable transport failure; the caller begins shutdown.
    pub fn run<H: PacketHandler>(&mut self, handler: &H) -> Result<(), QueueError> {
        info!("Entering receive loop on queue {}", self.queue_num);

        loop {
            let mut msg = match self.queue.recv() {
                Ok(msg) => msg,
                Err(e) => {
                    let err = QueueError::Recv(e);
                    if err.is_recoverable() {
                        warn!("Kernel queue overflow, packets dropped before delivery");
                        handler.on_overflow();
                        continue;
                    }
                    return Err(err);
                }
            };

            let verdict = handler.handle(msg.get_payload());
            msg.set_verdict(verdict.into());
            self.queue.verdict(msg).map_err(QueueError::Verdict)?;
        }
    }
}

impl Drop for QueueLoop {
    fn drop(&mut self) {
        if let Err(e) = self.queue.unbind(self.queue_num) {
            debug!("Failed to unbind queue {}: {}", self.queue_num, e);
        }
        // The netlink handle closes when the inner queue drops.
    }
}

impl From<Verdict> for NfqVerdict {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => NfqVerdict::Accept,
            Verdict::Drop => NfqVerdict::Drop,
        }
    }
}
