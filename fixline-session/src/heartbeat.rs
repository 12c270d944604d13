/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat and inactivity tracking.
//!
//! The client sends a Heartbeat every interval and expects to hear from the
//! venue at least every two intervals. Any inbound message counts. The
//! first deadline after connecting allows three intervals so the logon
//! exchange has room to complete.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Intervals allowed before the first inbound message.
const INITIAL_GRACE_INTERVALS: u32 = 3;

/// Intervals allowed between inbound messages.
const INACTIVITY_INTERVALS: u32 = 2;

/// Tracks the inactivity deadline of one connection.
///
/// Written by the receive loop, read by the send loop.
#[derive(Debug)]
pub struct LivenessMonitor {
    /// Heartbeat interval.
    interval: Duration,
    /// Time of the last inbound message, or of arming.
    last_received: Mutex<Instant>,
    /// Instant after which the connection is considered dead.
    deadline: Mutex<Instant>,
}

impl LivenessMonitor {
    /// Creates a monitor armed with the initial grace period.
    ///
    /// # Arguments
    /// * `interval` - The heartbeat interval
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last_received: Mutex::new(now),
            deadline: Mutex::new(now + interval * INITIAL_GRACE_INTERVALS),
        }
    }

    /// Records that a message was received and pushes the deadline out.
    pub fn on_message_received(&self) {
        let now = Instant::now();
        *self.last_received.lock() = now;
        *self.deadline.lock() = now + self.interval * INACTIVITY_INTERVALS;
    }

    /// Returns the current inactivity deadline.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        *self.deadline.lock()
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline()
    }

    /// Returns the time since the last message was received.
    #[must_use]
    pub fn time_since_last_received(&self) -> Duration {
        self.last_received.lock().elapsed()
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}
