/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory cache of sent messages.
//!
//! The send loop appends every frame it writes; the receive loop looks
//! frames up when the venue asks for a resend. Both sides go through the
//! same lock.

use fixline_core::message::SOH;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Size above which the cache is trimmed.
pub const RESEND_CACHE_TRIGGER: usize = 100;

/// Number of entries a trim takes off the trigger size, so that the most
/// recent `RESEND_CACHE_TRIGGER - RESEND_CACHE_TRIM` frames survive.
pub const RESEND_CACHE_TRIM: usize = 30;

/// Bounded cache of raw sent frames, oldest first.
#[derive(Debug)]
pub struct ResendCache {
    /// Cached frames.
    frames: RwLock<VecDeque<String>>,
    /// Size above which a trim happens.
    trigger: usize,
    /// Entries kept by a trim.
    retain: usize,
}

impl ResendCache {
    /// Creates an empty cache with the standard 100/30 policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RESEND_CACHE_TRIGGER, RESEND_CACHE_TRIM)
    }

    /// Creates an empty cache that, once it grows past `trigger`, keeps
    /// only the most recent `trigger - trim` frames.
    #[must_use]
    pub fn with_policy(trigger: usize, trim: usize) -> Self {
        Self {
            frames: RwLock::new(VecDeque::with_capacity(trigger + 1)),
            trigger,
            retain: trigger.saturating_sub(trim),
        }
    }

    /// Appends a sent frame, trimming if the cache grew past its trigger.
    pub fn push(&self, frame: impl Into<String>) {
        let mut frames = self.frames.write();
        frames.push_back(frame.into());
        if frames.len() > self.trigger {
            let excess = frames.len() - self.retain;
            frames.drain(..excess);
        }
    }

    /// Returns the cached frame whose MsgSeqNum (tag 34) is `seq`.
    ///
    /// `seq` is matched as text, exactly as the venue sent it.
    #[must_use]
    pub fn find_by_seq(&self, seq: &str) -> Option<String> {
        let needle = format!("{sep}34={seq}{sep}", sep = SOH as char);
        self.frames
            .read()
            .iter()
            .find(|frame| frame.contains(&needle))
            .cloned()
    }

    /// Returns the number of cached frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.read().is_empty()
    }

    /// Drops every cached frame.
    pub fn clear(&self) {
        self.frames.write().clear();
    }
}

impl Default for ResendCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: usize) -> String {
        format!("8=FIX.4.2\x019=10\x0135=0\x0134={seq}\x0110=000\x01")
    }

    #[test]
    fn test_push_and_find() {
        let cache = ResendCache::new();
        cache.push(frame(1));
        cache.push(frame(12));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.find_by_seq("12"), Some(frame(12)));
        assert_eq!(cache.find_by_seq("2"), None);
    }

    #[test]
    fn test_trim_keeps_most_recent_70() {
        let cache = ResendCache::new();
        for seq in 1..=100 {
            cache.push(frame(seq));
        }
        assert_eq!(cache.len(), 100);

        cache.push(frame(101));
        assert_eq!(cache.len(), 70);

        assert_eq!(cache.find_by_seq("31"), None);
        assert_eq!(cache.find_by_seq("32"), Some(frame(32)));
        assert_eq!(cache.find_by_seq("101"), Some(frame(101)));
    }

    #[test]
    fn test_never_exceeds_trigger() {
        let cache = ResendCache::new();
        for seq in 1..=1000 {
            cache.push(frame(seq));
            assert!(cache.len() <= RESEND_CACHE_TRIGGER);
        }
    }

    #[test]
    fn test_clear() {
        let cache = ResendCache::new();
        cache.push(frame(1));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.find_by_seq("1"), None);
    }
}
