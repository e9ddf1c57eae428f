//! Log number assignment.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing log numbers starting at 1.
///
/// Numbers are never reused, including after deletion. A backend that
/// persists entries recovers the sequencer from the highest number it has
/// ever written.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after `last`; the next number handed out is `last + 1`.
    pub fn after(last: Option<u64>) -> Self {
        Self {
            last: AtomicU64::new(last.unwrap_or(0)),
        }
    }

    /// Take the next number.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Highest number handed out so far.
    pub fn last(&self) -> Option<u64> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            n => Some(n),
        }
    }
}
