//! Command sequencing
//!
//! Privileged commands only take effect when the device has fully processed
//! an authorization sentence first. The sequencer owns the at-most-one
//! in-flight authorization/privileged pair: [`CommandSequencer::begin`]
//! hands back the authorization sentence for immediate transmission and arms
//! the settle timer for the privileged command; a second request inside the
//! settle window replaces the pending command, so the stale timer never
//! fires (last writer wins).
//!
//! The sequencer never touches the transport itself. The session task owns
//! all writes and polls [`CommandSequencer::settle_elapsed`] inside its
//! event loop, which keeps command sequencing single-threaded and lock-free.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use super::commands;

#[derive(Debug)]
struct Pending {
    sentence: &'static str,
    due: Instant,
}

/// Enforces the authorization-then-privileged-command ordering contract
#[derive(Debug)]
pub struct CommandSequencer {
    settle: Duration,
    pending: Option<Pending>,
}

impl CommandSequencer {
    /// Create a sequencer with the given settle delay
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: None,
        }
    }

    /// Arm the settle timer for a privileged command and return the
    /// authorization sentence to send immediately.
    ///
    /// Replaces any pending privileged command along with its timer.
    pub fn begin(&mut self, privileged: &'static str) -> &'static str {
        self.pending = Some(Pending {
            sentence: privileged,
            due: Instant::now() + self.settle,
        });
        commands::AUTHORIZATION
    }

    /// Whether a privileged command is waiting on its settle delay
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending privileged command; its timer never fires
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Resolve once the armed settle delay has elapsed.
    ///
    /// Pends forever while nothing is armed, so this composes directly into
    /// a `select!` loop without a separate guard.
    pub async fn settle_elapsed(&self) {
        match &self.pending {
            Some(p) => sleep_until(p.due).await,
            None => std::future::pending().await,
        }
    }

    /// Take the pending privileged command for transmission
    pub fn take_pending(&mut self) -> Option<&'static str> {
        self.pending.take().map(|p| p.sentence)
    }
}

impl Default for CommandSequencer {
    fn default() -> Self {
        Self::new(commands::SETTLE_DELAY)
    }
}
