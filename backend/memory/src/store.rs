use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use claimdesk_core::{Turn, UserId};

use crate::session::UserSession;

/// Bounds applied to every session.
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    /// Maximum turns kept per session (the pinned system turn counts).
    pub max_turns: usize,
    /// Sessions idle for longer than this are dropped.
    pub idle_timeout: Duration,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_turns: 24,
            idle_timeout: Duration::from_secs(6 * 60 * 60),
        }
    }
}

type Slot = Arc<Mutex<UserSession>>;

/// Process-wide map of user → session.
///
/// Mutations of one user's session are serialized by that session's lock;
/// different users never contend on a shared lock.
pub struct ContextStore {
    limits: StoreLimits,
    sessions: DashMap<UserId, Slot>,
}

fn lock(slot: &Slot) -> MutexGuard<'_, UserSession> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ContextStore {
    pub fn new(limits: StoreLimits) -> Self {
        info!(
            max_turns = limits.max_turns,
            idle_secs = limits.idle_timeout.as_secs(),
            "Context store initialized"
        );
        Self {
            limits,
            sessions: DashMap::new(),
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    fn slot(&self, user: &UserId, now: DateTime<Utc>) -> Slot {
        let entry = self
            .sessions
            .entry(user.clone())
            .or_insert_with(|| {
                debug!(user = %user, "Creating session");
                Arc::new(Mutex::new(UserSession::new(user.clone(), now)))
            });
        Arc::clone(entry.value())
    }

    /// Run `f` against the live session for `user`, creating it if needed.
    ///
    /// A session the sweeper retired in the meantime is skipped, and one that
    /// went stale without being swept yet is reset first.
    fn with_session<R>(&self, user: &UserId, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let now = Utc::now();
        loop {
            let slot = self.slot(user, now);
            let mut session = lock(&slot);
            if session.retired {
                continue;
            }
            if session.is_stale(now, self.limits.idle_timeout) {
                debug!(user = %user, "Resetting stale session on access");
                session.reset(now);
            }
            return f(&mut session);
        }
    }

    /// The current session for `user`, creating an empty one if absent.
    pub fn get_or_create(&self, user: &UserId) -> UserSession {
        self.with_session(user, |session| session.clone())
    }

    /// Append `turn` to the user's session, evicting down to the cap.
    /// Returns the number of turns evicted by this append.
    pub fn append(&self, user: &UserId, turn: Turn) -> usize {
        let cap = self.limits.max_turns;
        let evicted = self.with_session(user, |session| session.push(turn, cap, Utc::now()));
        if evicted > 0 {
            debug!(user = %user, evicted, "Evicted oldest turns");
        }
        evicted
    }

    /// The user's turns in chronological order; empty if there is no session.
    pub fn snapshot(&self, user: &UserId) -> Vec<Turn> {
        let Some(slot) = self.sessions.get(user).map(|entry| Arc::clone(entry.value())) else {
            return Vec::new();
        };
        let session = lock(&slot);
        if session.retired || session.is_stale(Utc::now(), self.limits.idle_timeout) {
            return Vec::new();
        }
        session.turns().to_vec()
    }

    /// Drop the user's session entirely.
    pub fn clear(&self, user: &UserId) -> bool {
        match self.sessions.remove(user) {
            Some((_, slot)) => {
                lock(&slot).retired = true;
                true
            }
            None => false,
        }
    }

    /// Remove every session idle for longer than the inactivity window at `now`.
    /// Returns how many sessions were removed.
    pub fn evict_stale(&self, now: DateTime<Utc>) -> usize {
        let window = self.limits.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|user, slot| {
            let mut session = lock(slot);
            if session.is_stale(now, window) {
                debug!(user = %user, "Session expired");
                session.retired = true;
                false
            } else {
                true
            }
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Periodically call [`evict_stale`](Self::evict_stale) until the task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = store.evict_stale(Utc::now());
                if removed > 0 {
                    info!(removed, remaining = store.len(), "Swept idle sessions");
                }
            }
        })
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use claimdesk_core::{Role, SourceTag};

    fn store(max_turns: usize) -> ContextStore {
        ContextStore::new(StoreLimits {
            max_turns,
            idle_timeout: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_get_or_create_is_lazy_and_single() {
        let store = store(4);
        let user = UserId::from("42");
        assert!(store.is_empty());
        assert!(store.snapshot(&user).is_empty());
        assert!(store.is_empty(), "snapshot must not create a session");

        let session = store.get_or_create(&user);
        assert!(session.is_empty());
        store.get_or_create(&user);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_never_exceeds_cap() {
        let store = store(5);
        let user = UserId::from("42");
        for i in 0..50 {
            store.append(&user, Turn::user(format!("m{i}"), SourceTag::Chat));
            assert!(store.snapshot(&user).len() <= 5);
        }
        let turns = store.snapshot(&user);
        assert_eq!(turns.first().unwrap().content, "m45");
        assert_eq!(turns.last().unwrap().content, "m49");
    }

    #[test]
    fn test_pinned_turn_survives_many_evictions() {
        let store = store(3);
        let user = UserId::from("42");
        store.append(&user, Turn::system("Trả lời bằng tiếng Việt"));
        for i in 0..100 {
            store.append(&user, Turn::user(format!("m{i}"), SourceTag::Chat));
            store.append(&user, Turn::assistant(format!("r{i}")));
        }
        let turns = store.snapshot(&user);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[2].content, "r99");
    }

    #[test]
    fn test_evict_stale_removes_idle_sessions() {
        let store = store(4);
        let idle = UserId::from("idle");
        store.append(&idle, Turn::user("hello", SourceTag::Chat));

        assert_eq!(store.evict_stale(Utc::now()), 0);
        let later = Utc::now() + ChronoDuration::seconds(120);
        assert_eq!(store.evict_stale(later), 1);
        assert!(store.is_empty());
        assert!(store.snapshot(&idle).is_empty());
    }

    #[test]
    fn test_append_after_sweep_starts_fresh_session() {
        let store = store(4);
        let user = UserId::from("42");
        store.append(&user, Turn::user("old", SourceTag::Chat));
        store.evict_stale(Utc::now() + ChronoDuration::seconds(3600));

        store.append(&user, Turn::user("new", SourceTag::Chat));
        let turns = store.snapshot(&user);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "new");
    }

    #[test]
    fn test_clear_drops_session() {
        let store = store(4);
        let user = UserId::from("42");
        store.append(&user, Turn::user("x", SourceTag::Chat));
        assert!(store.clear(&user));
        assert!(!store.clear(&user));
        assert!(store.snapshot(&user).is_empty());
    }

    #[test]
    fn test_concurrent_appends_for_one_user_are_not_lost() {
        let store = Arc::new(store(1000));
        let user = UserId::from("42");
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                let user = user.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.append(&user, Turn::user(format!("{t}-{i}"), SourceTag::Chat));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.snapshot(&user).len(), 400);
    }

    #[tokio::test]
    async fn test_sweeper_runs_periodically() {
        let store = Arc::new(ContextStore::new(StoreLimits {
            max_turns: 4,
            idle_timeout: Duration::ZERO,
        }));
        let user = UserId::from("42");
        store.append(&user, Turn::user("x", SourceTag::Chat));

        let sweeper = store.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        sweeper.abort();
        assert!(store.is_empty());
    }
}
