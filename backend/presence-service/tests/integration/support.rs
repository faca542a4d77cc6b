use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{dev::ServerHandle, web, App, HttpServer};
use awc::{error::WsProtocolError, ws};
use futures_util::{Stream, StreamExt};
use presence_service::config::WebSocketConfig;
use presence_service::handlers::{register_interactions, register_websocket};
use presence_service::middleware::JwtValidator;
use presence_service::models::UserId;
use presence_service::{AppState, InMemoryStore, OutboundEvent};

pub const SECRET: &str = "integration-test-secret-32-chars!!";

/// Store with three users; A and C each own one post
pub fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_user("A", "alice", "https://cdn/a.png");
    store.insert_user("B", "bob", "https://cdn/b.png");
    store.insert_user("C", "carol", "");
    store.insert_post("postA", "A", "beach");
    store.insert_post("postC", "C", "city");
    store
}

pub fn test_state(store: InMemoryStore) -> AppState {
    // Long heartbeat so pings never interleave with the frames under test
    let websocket = WebSocketConfig {
        heartbeat_interval: Duration::from_secs(60),
        client_timeout: Duration::from_secs(120),
    };
    AppState::new(Arc::new(store), websocket)
}

pub fn token_for(user: &str) -> String {
    JwtValidator::new(SECRET)
        .issue(&UserId::new(user), 3600)
        .expect("issue token")
}

pub async fn start_server(state: AppState) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let validator = web::Data::new(JwtValidator::new(SECRET));

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(validator.clone())
            .configure(|cfg| {
                register_websocket(cfg);
                register_interactions(cfg);
            })
    })
    .workers(1)
    .shutdown_timeout(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_rt::spawn(server);
    Ok((addr, handle))
}

/// Next application event on the socket, skipping control frames
pub async fn next_event<S>(conn: &mut S) -> OutboundEvent
where
    S: Stream<Item = Result<ws::Frame, WsProtocolError>> + Unpin,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), conn.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .expect("frame error");
        match frame {
            ws::Frame::Text(bytes) => {
                let text = std::str::from_utf8(&bytes).expect("utf8 frame");
                return OutboundEvent::from_json(text).expect("decode event");
            }
            ws::Frame::Ping(_) | ws::Frame::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Asserts no application event arrives within a short window
pub async fn expect_silence<S>(conn: &mut S)
where
    S: Stream<Item = Result<ws::Frame, WsProtocolError>> + Unpin,
{
    if let Ok(Some(Ok(ws::Frame::Text(bytes)))) =
        tokio::time::timeout(Duration::from_millis(300), conn.next()).await
    {
        panic!("unexpected event: {}", String::from_utf8_lossy(&bytes));
    }
}

pub fn roster(event: OutboundEvent) -> Vec<String> {
    match event {
        OutboundEvent::PresenceUpdate(users) => {
            users.into_iter().map(|u| u.as_str().to_string()).collect()
        }
        other => panic!("expected presence update, got {other:?}"),
    }
}
