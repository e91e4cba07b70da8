//! Status polling
//!
//! The transponder does not emit status on its own; the bridge queries it
//! with a fixed LED poll sentence, immediately on start and then on a fixed
//! period. The poller is purely a query generator and never inspects
//! responses; any LED status line received is attributed to the most recent
//! poll. That implicit correlation is a known protocol limitation (there are
//! no sequence numbers tying a poll to its reply), acceptable because the
//! device is not expected to emit unsolicited status.

use std::time::Duration;

use tokio::time::{interval, Interval};

use super::commands;

/// Periodic LED status query generator
#[derive(Debug)]
pub struct StatusPoller {
    period: Duration,
    ticker: Option<Interval>,
}

impl StatusPoller {
    /// Create a poller with the given period, initially stopped
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    /// Start polling; the first tick is due immediately.
    ///
    /// A no-op when already started.
    pub fn start(&mut self) {
        if self.ticker.is_none() {
            self.ticker = Some(interval(self.period));
        }
    }

    /// Cancel the periodic timer; idempotent
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Whether the poller is running
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Yield the poll sentence when the next tick is due.
    ///
    /// Pends forever while stopped, so this composes directly into a
    /// `select!` loop.
    pub async fn due(&mut self) -> &'static str {
        match &mut self.ticker {
            Some(ticker) => {
                ticker.tick().await;
                commands::LED_POLL
            }
            None => std::future::pending().await,
        }
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(commands::POLL_INTERVAL)
    }
}
