use super::{ConnectionHandle, ConnectionId, ConnectionRegistry, OutboundEvent};
use crate::metrics;
use crate::models::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Tracks every open endpoint and keeps clients' online rosters current
///
/// Each lifecycle event mutates the registry, snapshots it and broadcasts
/// while holding the endpoint lock, so broadcasts go out in the same order as
/// the mutations they describe.
#[derive(Clone)]
pub struct PresenceCoordinator {
    registry: ConnectionRegistry,
    endpoints: Arc<Mutex<HashMap<ConnectionId, ConnectionHandle>>>,
}

impl PresenceCoordinator {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            endpoints: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A connection finished its handshake
    ///
    /// Anonymous connections (`None`) still receive later broadcasts but are
    /// not registered and trigger none. Returns the roster that was broadcast.
    pub fn connection_opened(
        &self,
        user_id: Option<UserId>,
        handle: ConnectionHandle,
    ) -> Option<Vec<UserId>> {
        let mut endpoints = self.endpoints.lock();
        endpoints.insert(handle.id(), handle.clone());

        let roster = match user_id {
            Some(user_id) => {
                tracing::info!(user_id = %user_id, connection_id = %handle.id(), "user connected");
                self.registry.register(user_id, handle);
                let roster = self.registry.snapshot_user_ids();
                broadcast(&endpoints, &roster);
                Some(roster)
            }
            None => {
                tracing::info!(connection_id = %handle.id(), "anonymous connection opened");
                None
            }
        };

        metrics::set_presence_gauges(self.registry.len(), endpoints.len());
        roster
    }

    /// A connection closed for any reason (clean close, error or timeout)
    ///
    /// Re-broadcasts only when this connection was still the registered one
    /// for its user. Returns the roster that was broadcast.
    pub fn connection_closed(
        &self,
        user_id: Option<&UserId>,
        handle: &ConnectionHandle,
    ) -> Option<Vec<UserId>> {
        let mut endpoints = self.endpoints.lock();
        endpoints.remove(&handle.id());

        let roster = match user_id {
            Some(user_id) if self.registry.unregister(user_id, handle) => {
                tracing::info!(user_id = %user_id, connection_id = %handle.id(), "user disconnected");
                let roster = self.registry.snapshot_user_ids();
                broadcast(&endpoints, &roster);
                Some(roster)
            }
            _ => {
                tracing::debug!(connection_id = %handle.id(), "connection closed without presence change");
                None
            }
        };

        metrics::set_presence_gauges(self.registry.len(), endpoints.len());
        roster
    }

    pub fn online_users(&self) -> Vec<UserId> {
        self.registry.snapshot_user_ids()
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.registry.is_online(user_id)
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.lock().len()
    }
}

fn broadcast(endpoints: &HashMap<ConnectionId, ConnectionHandle>, roster: &[UserId]) {
    let event = OutboundEvent::PresenceUpdate(roster.to_vec());
    let mut delivered = 0usize;
    for handle in endpoints.values() {
        // A dead endpoint is cleaned up by its own close event
        if handle.send(event.clone()) {
            delivered += 1;
        }
    }
    tracing::debug!(
        online = roster.len(),
        endpoints = endpoints.len(),
        delivered,
        "broadcast online users"
    );
}
