use super::{ConnectionRegistry, NotificationEvent, OutboundEvent};
use crate::metrics;
use crate::models::UserId;

/// Result of a best-effort delivery attempt
///
/// Neither variant is a failure; callers are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "delivery outcomes are informational; bind to `_` to ignore"]
pub enum DeliveryOutcome {
    Delivered,
    NoRecipient,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::NoRecipient => "no_recipient",
        }
    }
}

/// Routes events to the live connection of one user
///
/// Fire-and-forget: nothing is buffered, retried or acknowledged.
#[derive(Clone)]
pub struct NotificationRouter {
    registry: ConnectionRegistry,
}

impl NotificationRouter {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn route_notification(&self, event: NotificationEvent) -> DeliveryOutcome {
        let target = event.target_user_id.clone();
        let kind = event.kind;
        let outcome = self.deliver(&target, OutboundEvent::Notification(event));
        tracing::debug!(
            target_user_id = %target,
            kind = %kind,
            outcome = outcome.as_str(),
            "notification routed"
        );
        outcome
    }

    /// Push any outbound event to `target` if they are connected
    pub fn deliver(&self, target: &UserId, event: OutboundEvent) -> DeliveryOutcome {
        let name = event.name();
        let outcome = match self.registry.lookup(target) {
            Some(handle) if handle.send(event) => DeliveryOutcome::Delivered,
            // Receiver already gone; its close event will clear the entry
            Some(_) | None => DeliveryOutcome::NoRecipient,
        };
        metrics::record_delivery(name, outcome.as_str());
        outcome
    }
}
