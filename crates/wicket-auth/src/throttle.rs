//! Fixed-window failure throttling per client identity.
//!
//! Counters are shared across every locally-verified credential kind:
//! alternating basic and bearer attempts lands in the same bucket. The
//! store is in-memory only and resets on process restart - an accepted
//! weakness of this gateway, not a defect.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::warn;
use wicket_core::{ClientId, Timestamp};

/// A single client's failure count inside the current window.
#[derive(Debug, Clone, Copy)]
struct FailureCounter {
    count: u32,
    window_start: Timestamp,
}

/// Whether a client may attempt authentication right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Under the threshold (or window elapsed); proceed.
    Clear,
    /// Over the threshold; reject with `429` and `Retry-After`.
    Limited {
        /// Seconds until the window resets.
        retry_after_secs: u64,
    },
}

impl ThrottleDecision {
    /// Whether the client is currently limited.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }
}

/// Counts authentication failures per client and blocks repeat offenders
/// for the remainder of the fixed window.
#[derive(Debug)]
pub struct FailureThrottle {
    counters: DashMap<ClientId, FailureCounter>,
    max_failures: u32,
    window_secs: i64,
}

impl FailureThrottle {
    /// Create a throttle allowing `max_failures` per `window_secs` window.
    #[must_use]
    pub fn new(max_failures: u32, window_secs: i64) -> Self {
        Self {
            counters: DashMap::new(),
            max_failures: max_failures.max(1),
            window_secs: window_secs.max(1),
        }
    }

    /// Record one authentication failure for a client.
    ///
    /// Called before the denial goes out, so the failing attempt itself
    /// counts toward the threshold.
    pub fn record_failure(&self, client: ClientId, now: Timestamp) {
        let count = match self.counters.entry(client) {
            Entry::Occupied(mut occupied) => {
                let counter = occupied.get_mut();
                if now >= counter.window_start.plus_seconds(self.window_secs) {
                    counter.count = 1;
                    counter.window_start = now;
                } else {
                    counter.count = counter.count.saturating_add(1);
                }
                counter.count
            }
            Entry::Vacant(vacant) => {
                vacant.insert(FailureCounter {
                    count: 1,
                    window_start: now,
                });
                1
            }
        };
        if count == self.max_failures {
            warn!(client = %client, failures = count, "client reached failure threshold");
        }
    }

    /// Whether a client is currently throttled, and for how long.
    ///
    /// A throttled check does not itself count as a failure - the caller
    /// returns `429` without recording anything, so attempts are never
    /// double-counted.
    #[must_use]
    pub fn check(&self, client: ClientId, now: Timestamp) -> ThrottleDecision {
        let decision = {
            let Some(counter) = self.counters.get(&client) else {
                return ThrottleDecision::Clear;
            };
            let window_end = counter.window_start.plus_seconds(self.window_secs);
            if now >= window_end {
                None
            } else if counter.count >= self.max_failures {
                let remaining = now.seconds_until(window_end).max(1);
                Some(ThrottleDecision::Limited {
                    retry_after_secs: u64::try_from(remaining).unwrap_or(1),
                })
            } else {
                Some(ThrottleDecision::Clear)
            }
        };
        match decision {
            Some(d) => d,
            None => {
                // window elapsed: drop the stale counter
                self.counters.remove(&client);
                ThrottleDecision::Clear
            }
        }
    }

    /// Current failure count for a client (test hook).
    #[must_use]
    pub fn failure_count(&self, client: ClientId) -> u32 {
        self.counters.get(&client).map_or(0, |c| c.count)
    }

    /// Drop all counters.
    pub fn reset(&self) {
        self.counters.clear();
    }
}
