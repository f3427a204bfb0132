use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use claimdesk_core::{evict_to_cap, pinned_index, Turn, UserId};

/// The bounded conversation history of one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    user: UserId,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    /// Set once the sweeper has removed this session from the store.
    #[serde(skip)]
    pub(crate) retired: bool,
}

impl UserSession {
    pub fn new(user: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user,
            turns: Vec::new(),
            created_at: now,
            last_activity: now,
            retired: false,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Turns in chronological order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Whether the session has been idle for longer than `window` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match (now - self.last_activity).to_std() {
            Ok(idle) => idle > window,
            Err(_) => false,
        }
    }

    /// Append a turn, refresh activity, and evict down to `cap`.
    /// Returns the number of evicted turns.
    pub(crate) fn push(&mut self, turn: Turn, cap: usize, now: DateTime<Utc>) -> usize {
        self.turns.push(turn);
        self.last_activity = now;
        let pinned = pinned_index(&self.turns);
        evict_to_cap(&mut self.turns, cap, pinned)
    }

    /// Start over as if the session had just been created.
    pub(crate) fn reset(&mut self, now: DateTime<Utc>) {
        self.turns.clear();
        self.created_at = now;
        self.last_activity = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use claimdesk_core::{Role, SourceTag};

    #[test]
    fn test_push_refreshes_activity_and_caps() {
        let start = Utc::now();
        let mut session = UserSession::new(UserId::from("u1"), start);
        let later = start + ChronoDuration::seconds(30);
        for i in 0..5 {
            session.push(Turn::user(format!("m{i}"), SourceTag::Chat), 3, later);
        }
        assert_eq!(session.len(), 3);
        assert_eq!(session.last_activity(), later);
        assert_eq!(session.turns()[0].content, "m2");
    }

    #[test]
    fn test_system_turn_survives_cap() {
        let now = Utc::now();
        let mut session = UserSession::new(UserId::from("u1"), now);
        session.push(Turn::system("rules"), 2, now);
        for i in 0..10 {
            session.push(Turn::user(format!("m{i}"), SourceTag::Chat), 2, now);
        }
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].role, Role::System);
        assert_eq!(session.turns()[1].content, "m9");
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let session = UserSession::new(UserId::from("u1"), now);
        let window = Duration::from_secs(60);
        assert!(!session.is_stale(now + ChronoDuration::seconds(60), window));
        assert!(session.is_stale(now + ChronoDuration::seconds(61), window));
        assert!(!session.is_stale(now - ChronoDuration::seconds(600), window));
    }
}
