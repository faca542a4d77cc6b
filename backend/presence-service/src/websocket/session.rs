use super::messages::InboundEvent;
use super::{ConnectionHandle, OutboundEvent, PresenceCoordinator};
use crate::config::WebSocketConfig;
use crate::models::UserId;
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// WebSocket actor for one client connection
///
/// Registration happens in `started` and removal in `stopped`, so every way a
/// socket can end (close frame, protocol error, dropped TCP stream, heartbeat
/// timeout) goes through the same close path.
pub struct WsSession {
    user_id: Option<UserId>,
    handle: ConnectionHandle,
    outbound: Option<UnboundedReceiver<OutboundEvent>>,
    presence: PresenceCoordinator,
    heartbeat: WebSocketConfig,
    hb: Instant,
}

impl WsSession {
    pub fn new(
        user_id: Option<UserId>,
        presence: PresenceCoordinator,
        heartbeat: WebSocketConfig,
    ) -> Self {
        let (handle, outbound) = ConnectionHandle::channel();
        Self {
            user_id,
            handle,
            outbound: Some(outbound),
            presence,
            heartbeat,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.hb) > act.heartbeat.client_timeout {
                tracing::warn!(
                    connection_id = %act.handle.id(),
                    "WebSocket heartbeat failed, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);

        if let Some(rx) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(rx));
        }

        let _ = self
            .presence
            .connection_opened(self.user_id.clone(), self.handle.clone());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let _ = self
            .presence
            .connection_closed(self.user_id.as_ref(), &self.handle);
    }
}

// Events queued for this connection by the coordinator or router
impl StreamHandler<OutboundEvent> for WsSession {
    fn handle(&mut self, event: OutboundEvent, ctx: &mut Self::Context) {
        match event.to_json() {
            Ok(json) => ctx.text(json),
            Err(e) => tracing::warn!(event = event.name(), "Failed to serialize outbound event: {}", e),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<InboundEvent>(&text) {
                Ok(InboundEvent::Ping) => {
                    self.hb = Instant::now();
                }
                Err(_) => {
                    tracing::debug!(
                        connection_id = %self.handle.id(),
                        "ignoring unsupported client message"
                    );
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("Received binary message (unsupported)");
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                tracing::warn!("Received continuation frame (closing connection)");
                ctx.stop();
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!("WebSocket close message received: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(connection_id = %self.handle.id(), "WebSocket protocol error: {}", e);
                ctx.stop();
            }
        }
    }
}
