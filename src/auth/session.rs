use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// A live login binding: opaque session id → user id, with an expiry.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Thread-safe in-memory session store.
///
/// Sessions live only as long as the process; a cookie naming an id that is
/// missing, expired, or tampered with simply resolves to anonymous. Expired
/// records are dropped lazily on lookup and in bulk by the sweep job.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionRecord>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Establish a session for a user and return the new opaque id.
    pub fn login(&self, user_id: i64) -> String {
        let session_id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        self.sessions.insert(
            session_id.clone(),
            SessionRecord {
                user_id,
                created_at: now,
                expires_at: now + self.ttl,
            },
        );
        session_id
    }

    /// Destroy a session binding. Unknown ids are a no-op, which keeps
    /// logout idempotent.
    pub fn logout(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Resolve a session id to its user, or `None` for anything invalid.
    pub fn current_identity(&self, session_id: &str) -> Option<i64> {
        if let Some(entry) = self.sessions.get(session_id) {
            let record = entry.value().clone();
            if Utc::now() < record.expires_at {
                return Some(record.user_id);
            }
            // Expired: release the read lock before removing.
            drop(entry);
            self.sessions.remove(session_id);
        }
        None
    }

    /// Drop every expired record; returns how many were removed.
    ///
    /// The count comes from the retain pass itself. Comparing map sizes
    /// before and after would miscount whenever a concurrent login lands
    /// mid-sweep.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            let keep = now < record.expires_at;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_establishes_an_identity() {
        let store = SessionStore::new(1);
        let sid = store.login(42);
        assert_eq!(store.current_identity(&sid), Some(42));
    }

    #[test]
    fn logout_destroys_the_binding_and_is_idempotent() {
        let store = SessionStore::new(1);
        let sid = store.login(42);
        store.logout(&sid);
        assert_eq!(store.current_identity(&sid), None);
        // Second logout must not panic or error.
        store.logout(&sid);
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_or_tampered_ids_resolve_to_anonymous() {
        let store = SessionStore::new(1);
        let sid = store.login(42);
        assert_eq!(store.current_identity("deadbeef"), None);
        assert_eq!(store.current_identity(&format!("{}x", sid)), None);
    }

    #[test]
    fn expired_sessions_resolve_to_anonymous_and_are_dropped() {
        let store = SessionStore::new(0);
        let sid = store.login(42);
        assert_eq!(store.current_identity(&sid), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn cleanup_removes_only_expired_records() {
        let expired = SessionStore::new(0);
        expired.login(1);
        expired.login(2);
        assert_eq!(expired.cleanup_expired(), 2);

        let live = SessionStore::new(1);
        live.login(3);
        assert_eq!(live.cleanup_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn cleanup_count_stays_exact_under_concurrent_logins() {
        let store = SessionStore::new(1);
        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    store.login(9);
                }
            })
        };

        // Nothing in this store can expire, so every sweep must report zero
        // no matter how many logins land mid-sweep.
        for _ in 0..50 {
            assert_eq!(store.cleanup_expired(), 0);
        }

        writer.join().unwrap();
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn session_ids_are_unique_per_login() {
        let store = SessionStore::new(1);
        let a = store.login(1);
        let b = store.login(1);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}
