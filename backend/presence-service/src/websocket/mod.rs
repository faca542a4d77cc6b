/// Real-time presence and notification fan-out
///
/// Architecture:
/// 1. ConnectionRegistry: user id -> the single live connection for that user
/// 2. PresenceCoordinator: connection lifecycle, online-user roster broadcast
/// 3. NotificationRouter: best-effort point-to-point delivery
/// 4. WsSession: actix actor wiring one socket into the above
use std::fmt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

pub mod messages;
pub mod presence;
pub mod registry;
pub mod router;
pub mod session;

pub use messages::{NotificationEvent, NotificationKind, OutboundEvent};
pub use presence::PresenceCoordinator;
pub use registry::ConnectionRegistry;
pub use router::{DeliveryOutcome, NotificationRouter};

/// Unique identifier for a single WebSocket connection
///
/// Two connections of the same user never share an id, which is what lets a
/// late close of a superseded socket be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending side of one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: UnboundedSender<OutboundEvent>,
}

impl ConnectionHandle {
    /// Create a handle together with the receiver the connection drains
    pub fn channel() -> (Self, UnboundedReceiver<OutboundEvent>) {
        let (sender, rx) = unbounded_channel();
        (
            Self {
                id: ConnectionId::new(),
                sender,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Identity comparison; two clones of one handle are the same connection
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        self.id == other.id
    }

    /// Queue an event; `false` once the connection side has gone away
    pub fn send(&self, event: OutboundEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
