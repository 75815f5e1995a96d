use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::submission::record::RecordKind;

/// Per-form, per-IP fixed-window submission limiter.
pub struct SubmissionRateLimiter {
    /// (form kind, ip) -> (count, window_start)
    entries: DashMap<(RecordKind, IpAddr), (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl SubmissionRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and count a submission. Returns Ok(()) or Err with retry-after seconds.
    pub fn check(&self, kind: RecordKind, ip: IpAddr) -> Result<(), u64> {
        let now = Instant::now();

        let mut entry = self.entries.entry((kind, ip)).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= self.limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed).max(1));
        }

        *count += 1;
        Ok(())
    }

    /// Remove entries whose window has expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) <= self.window);
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}
