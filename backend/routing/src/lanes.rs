//! Per-user FIFO lanes.
//!
//! Holding a lane guard means no other event for the same user is being
//! handled. Waiters are served in the order they called `acquire`.

use std::sync::Arc;

use claimdesk_core::UserId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive hold on one user's lane. Dropping it, including during a panic
/// unwind, unlocks the lane and forgets it when nobody else is queued.
pub struct LaneGuard<'a> {
    lanes: &'a UserLanes,
    user: UserId,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        self.lanes.release(&self.user);
    }
}

#[derive(Default)]
pub struct UserLanes {
    lanes: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user: &UserId) -> LaneGuard<'_> {
        let lane = Arc::clone(
            self.lanes
                .entry(user.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        LaneGuard {
            lanes: self,
            user: user.clone(),
            held: Some(lane.lock_owned().await),
        }
    }

    /// Forget the user's lane if nobody holds or waits on it.
    pub fn release(&self, user: &UserId) {
        self.lanes.remove_if(user, |_, lane| Arc::strong_count(lane) == 1);
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let lanes = Arc::new(UserLanes::new());
        let user = UserId::from("7");
        let guard = lanes.acquire(&user).await;

        let waiter = {
            let lanes = Arc::clone(&lanes);
            let user = user.clone();
            tokio::spawn(async move {
                let _g = lanes.acquire(&user).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_users_are_independent() {
        let lanes = UserLanes::new();
        let _a = lanes.acquire(&UserId::from("a")).await;
        let b = tokio::time::timeout(Duration::from_millis(50), lanes.acquire(&UserId::from("b"))).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_release_drops_idle_lanes_only() {
        let lanes = UserLanes::new();
        let user = UserId::from("7");
        let guard = lanes.acquire(&user).await;
        lanes.release(&user);
        assert_eq!(lanes.len(), 1);
        drop(guard);
        assert!(lanes.is_empty());
    }

    #[tokio::test]
    async fn test_lane_kept_while_someone_waits() {
        let lanes = Arc::new(UserLanes::new());
        let user = UserId::from("7");
        let first = lanes.acquire(&user).await;

        let waiter = {
            let lanes = Arc::clone(&lanes);
            let user = user.clone();
            tokio::spawn(async move {
                let _g = lanes.acquire(&user).await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(first);
        assert_eq!(lanes.len(), 1);

        waiter.await.unwrap();
        assert!(lanes.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_holder_releases_lane() {
        let lanes = Arc::new(UserLanes::new());
        let task = {
            let lanes = Arc::clone(&lanes);
            tokio::spawn(async move {
                let _g = lanes.acquire(&UserId::from("7")).await;
                panic!("handler blew up");
            })
        };
        assert!(task.await.unwrap_err().is_panic());
        assert!(lanes.is_empty());

        let again = tokio::time::timeout(Duration::from_millis(50), lanes.acquire(&UserId::from("7"))).await;
        assert!(again.is_ok());
    }
}
