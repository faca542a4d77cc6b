use super::ConnectionHandle;
use crate::models::UserId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps each online user to their single live connection
///
/// Last connection wins: registering a user again replaces the stored handle.
/// Removal is by handle identity so a superseded socket closing late cannot
/// evict its replacement. All operations take the lock briefly and never await.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<UserId, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the handle for `user_id`
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) {
        let mut guard = self.inner.write();
        if let Some(previous) = guard.insert(user_id.clone(), handle) {
            tracing::debug!(
                user_id = %user_id,
                superseded = %previous.id(),
                "replaced existing connection"
            );
        }
    }

    /// Remove `user_id` only while it still points at `handle`
    ///
    /// Returns whether the registry changed.
    pub fn unregister(&self, user_id: &UserId, handle: &ConnectionHandle) -> bool {
        let mut guard = self.inner.write();
        match guard.get(user_id) {
            Some(current) if current.same_connection(handle) => {
                guard.remove(user_id);
                true
            }
            Some(current) => {
                tracing::debug!(
                    user_id = %user_id,
                    stale = %handle.id(),
                    live = %current.id(),
                    "ignoring close of superseded connection"
                );
                false
            }
            None => false,
        }
    }

    pub fn lookup(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.inner.read().get(user_id).cloned()
    }

    /// Point-in-time view of every registered user, sorted
    pub fn snapshot_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.inner.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.inner.read().contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
