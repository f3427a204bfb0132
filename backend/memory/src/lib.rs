//! Conversation context kept per user between turns.
//!
//! A [`ContextStore`] owns every [`UserSession`]; sessions are created on
//! first use, capped on every append, and dropped after a period of
//! inactivity by [`ContextStore::evict_stale`] (run periodically by
//! [`ContextStore::spawn_sweeper`]).

pub mod session;
pub mod store;

pub use session::UserSession;
pub use store::{ContextStore, StoreLimits};
