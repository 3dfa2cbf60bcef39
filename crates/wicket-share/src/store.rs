//! One-time consumption store.
//!
//! Tracks which one-time nonces have been redeemed and maps a redeemed
//! token to a short-lived session so a single link can serve the
//! sub-requests of one browsing flow (assets, previews) without
//! re-consuming the nonce.
//!
//! Everything here is process-lifetime and in-memory. The maps are
//! internally synchronized; callers never take a lock. Nonce consumption
//! is the one operation whose atomicity is load-bearing: two requests
//! racing to redeem the same nonce must see exactly one success.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use wicket_core::{SessionId, Timestamp};

use crate::token::{DEFAULT_CLOCK_SKEW_SECS, ShareAccessContext};

/// Default cap on live sessions before the oldest are evicted.
const DEFAULT_MAX_SESSIONS: usize = 4096;

/// A session minted on first redemption of a one-time token.
#[derive(Debug, Clone)]
pub struct OneTimeSession {
    /// Unguessable session identifier.
    pub id: SessionId,
    /// The share context, with its raw token blanked.
    pub context: ShareAccessContext,
    /// When the session was created.
    pub created_at: Timestamp,
}

/// Tracks redeemed nonces and their follow-on sessions.
#[derive(Debug)]
pub struct RedemptionStore {
    /// Redeemed nonce -> expiry (unix seconds), kept for purging.
    consumed: DashMap<String, i64>,
    sessions: DashMap<SessionId, OneTimeSession>,
    clock_skew_secs: i64,
    max_sessions: usize,
}

impl RedemptionStore {
    /// Create a store with default skew tolerance and session cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_SESSIONS)
    }

    /// Create a store with explicit limits.
    ///
    /// `clock_skew_secs` must match the token service's tolerance so that
    /// a token and its session expire at the same instant.
    #[must_use]
    pub fn with_limits(clock_skew_secs: i64, max_sessions: usize) -> Self {
        Self {
            consumed: DashMap::new(),
            sessions: DashMap::new(),
            clock_skew_secs,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Atomically mark a nonce as consumed.
    ///
    /// Returns `true` exactly once per nonce across any number of
    /// concurrent callers; every other caller sees `false`. A nonce whose
    /// token is already past expiry (plus tolerance) is refused without
    /// being recorded.
    #[must_use]
    pub fn try_consume_nonce(
        &self,
        nonce: &str,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> bool {
        if self.is_stale(expires_at, now) {
            return false;
        }
        // the entry holds its shard lock, so first-insert is atomic
        match self.consumed.entry(nonce.to_string()) {
            Entry::Occupied(_) => {
                debug!("one-time nonce replay refused");
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(expires_at.unix_seconds());
                true
            }
        }
    }

    /// Create a session for a freshly consumed one-time token.
    ///
    /// The stored context has its raw token blanked so the secret is not
    /// retained beyond first use.
    #[must_use]
    pub fn create_session(&self, context: ShareAccessContext, now: Timestamp) -> SessionId {
        self.sweep(now);

        let id = SessionId::new();
        let session = OneTimeSession {
            id: id.clone(),
            context: context.with_blanked_token(),
            created_at: now,
        };
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Look up the context for a session.
    ///
    /// Enforces the expiry captured at mint time plus the skew tolerance;
    /// expired sessions are dropped on the spot.
    #[must_use]
    pub fn session_context(&self, id: &SessionId, now: Timestamp) -> Option<ShareAccessContext> {
        let expired = {
            let session = self.sessions.get(id)?;
            if self.is_stale(session.context.expires_at, now) {
                true
            } else {
                return Some(session.context.clone());
            }
        };
        if expired {
            self.sessions.remove(id);
        }
        None
    }

    /// Purge expired nonces and sessions, and enforce the session cap.
    ///
    /// Runs opportunistically on every session creation; the stores are
    /// bounded by expiry plus the cap, never by operator attention.
    pub fn sweep(&self, now: Timestamp) {
        let horizon = now.unix_seconds();
        let skew = self.clock_skew_secs;
        self.consumed
            .retain(|_, expires| horizon <= expires.saturating_add(skew));
        self.sessions
            .retain(|_, session| !self.is_stale(session.context.expires_at, now));

        let excess = self.sessions.len().saturating_sub(self.max_sessions);
        if excess > 0 {
            let mut by_age: Vec<(SessionId, Timestamp)> = self
                .sessions
                .iter()
                .map(|entry| (entry.id.clone(), entry.created_at))
                .collect();
            by_age.sort_by_key(|(_, created)| *created);
            for (id, _) in by_age.into_iter().take(excess) {
                self.sessions.remove(&id);
            }
        }
    }

    /// Number of live sessions (test and metrics hook).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of recorded nonces (test and metrics hook).
    #[must_use]
    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }

    fn is_stale(&self, expires_at: Timestamp, now: Timestamp) -> bool {
        now > expires_at.plus_seconds(self.clock_skew_secs)
    }
}

impl Default for RedemptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ShareMode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(unix: i64) -> Timestamp {
        Timestamp::from_unix_seconds(unix).unwrap()
    }

    fn context(expires: i64) -> ShareAccessContext {
        ShareAccessContext {
            mode: ShareMode::Directory,
            scope_path: "docs".to_string(),
            expires_at: at(expires),
            token: "raw.token".to_string(),
            one_time: true,
            nonce: Some("abc123".to_string()),
        }
    }

    #[test]
    fn test_first_consume_wins_second_loses() {
        let store = RedemptionStore::new();
        assert!(store.try_consume_nonce("n1", at(10_000), at(5_000)));
        assert!(!store.try_consume_nonce("n1", at(10_000), at(5_000)));
        // a different nonce is unaffected
        assert!(store.try_consume_nonce("n2", at(10_000), at(5_000)));
    }

    #[test]
    fn test_stale_nonce_refused() {
        let store = RedemptionStore::with_limits(30, 16);
        assert!(!store.try_consume_nonce("n1", at(1_000), at(2_000)));
        assert_eq!(store.consumed_count(), 0);
    }

    #[test]
    fn test_concurrent_consumption_single_winner() {
        let store = Arc::new(RedemptionStore::new());
        let wins = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let wins = Arc::clone(&wins);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    if store.try_consume_nonce("racy", at(10_000), at(5_000)) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_round_trip_blanks_token() {
        let store = RedemptionStore::new();
        let id = store.create_session(context(10_000), at(5_000));

        let ctx = store.session_context(&id, at(5_100)).unwrap();
        assert!(ctx.token.is_empty());
        assert_eq!(ctx.scope_path, "docs");
        assert!(ctx.one_time);
    }

    #[test]
    fn test_session_expires_with_token() {
        let store = RedemptionStore::with_limits(30, 16);
        let id = store.create_session(context(10_000), at(5_000));

        assert!(store.session_context(&id, at(10_030)).is_some());
        assert!(store.session_context(&id, at(10_031)).is_none());
        // the expired entry was dropped, not just masked
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_unknown_session_is_none() {
        let store = RedemptionStore::new();
        assert!(store.session_context(&SessionId::new(), at(5_000)).is_none());
    }

    #[test]
    fn test_sweep_purges_expired() {
        let store = RedemptionStore::with_limits(30, 16);
        assert!(store.try_consume_nonce("n1", at(6_000), at(5_000)));
        let _id = store.create_session(context(6_000), at(5_000));
        assert_eq!(store.consumed_count(), 1);
        assert_eq!(store.session_count(), 1);

        store.sweep(at(7_000));
        assert_eq!(store.consumed_count(), 0);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_session_cap_evicts_oldest() {
        let store = RedemptionStore::with_limits(30, 2);
        let oldest = store.create_session(context(100_000), at(1_000));
        let _mid = store.create_session(context(100_000), at(2_000));
        // creating a third sweeps first: cap 2 already reached, oldest goes
        let _newest = store.create_session(context(100_000), at(3_000));

        assert!(store.session_count() <= 3);
        store.sweep(at(3_000));
        assert_eq!(store.session_count(), 2);
        assert!(store.session_context(&oldest, at(3_000)).is_none());
    }
}
