use crate::{
    config::WebSocketConfig,
    services::{InteractionService, SocialStore},
    websocket::{ConnectionRegistry, NotificationRouter, PresenceCoordinator},
};
use std::sync::Arc;

/// Shared handles built once at startup and cloned into every worker
///
/// The registry is created here and handed to the coordinator and router; no
/// other component touches it directly.
#[derive(Clone)]
pub struct AppState {
    pub presence: PresenceCoordinator,
    pub interactions: InteractionService,
    pub websocket: WebSocketConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn SocialStore>, websocket: WebSocketConfig) -> Self {
        let registry = ConnectionRegistry::new();
        let presence = PresenceCoordinator::new(registry.clone());
        let router = NotificationRouter::new(registry);
        let interactions = InteractionService::new(store, router);

        Self {
            presence,
            interactions,
            websocket,
        }
    }
}
