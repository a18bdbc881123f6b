//! Periodic checkpoint cadence for long-running fetches.
//!
//! The policy only decides *when* to flush; the fetcher decides *what* to write.
//! A flush is due when at least `every_rows` rows arrived since the last flush,
//! or when `every` has elapsed since the last flush, whichever comes first.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointPolicy {
    pub every_rows: Option<usize>,
    pub every: Option<Duration>,
}

impl CheckpointPolicy {
    pub fn never() -> Self {
        Self { every_rows: None, every: None }
    }
    pub fn every_rows(rows: usize) -> Self {
        Self { every_rows: Some(rows.max(1)), every: None }
    }
    pub fn interval(every: Duration) -> Self {
        Self { every_rows: None, every: Some(every) }
    }
    /// Also flush when `every` has elapsed, in addition to any row cadence.
    pub fn or_every(mut self, every: Duration) -> Self {
        self.every = Some(every);
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.every_rows.is_none() && self.every.is_none()
    }

    /// Start tracking from `now` with nothing flushed yet.
    pub fn start(self, now: Instant) -> Checkpointer {
        Checkpointer { policy: self, flushed_rows: 0, last_flush: now, flushes: 0 }
    }
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self::every_rows(5_000)
    }
}

/// Mutable cadence state for one run.
#[derive(Debug)]
pub struct Checkpointer {
    policy: CheckpointPolicy,
    flushed_rows: usize,
    last_flush: Instant,
    flushes: usize,
}

impl Checkpointer {
    /// Whether a flush is due given the current accumulation size.
    /// Never due when nothing new arrived since the last flush.
    pub fn due(&self, accumulated: usize, now: Instant) -> bool {
        let fresh = accumulated.saturating_sub(self.flushed_rows);
        if fresh == 0 {
            return false;
        }
        if let Some(k) = self.policy.every_rows {
            if fresh >= k {
                return true;
            }
        }
        if let Some(t) = self.policy.every {
            if now.saturating_duration_since(self.last_flush) >= t {
                return true;
            }
        }
        false
    }

    /// Record a completed flush.
    pub fn mark(&mut self, accumulated: usize, now: Instant) {
        self.flushed_rows = accumulated;
        self.last_flush = now;
        self.flushes += 1;
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}
