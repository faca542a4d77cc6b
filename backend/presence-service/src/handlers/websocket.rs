/// WebSocket upgrade and presence endpoints
///
/// Clients connect to `GET /ws?userId=<id>`; the id is trusted as handed over
/// by the identity layer, and a missing or blank id makes the connection
/// anonymous.
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use actix_web_actors::ws;
use serde_json::json;

use crate::models::UserId;
use crate::state::AppState;
use crate::websocket::session::WsSession;

/// Identity from the handshake query
///
/// Never rejects: an undecodable query or a blank id yields an anonymous
/// connection, and a repeated `userId` key keeps the first value.
pub fn handshake_user_id(query: &str) -> Option<UserId> {
    let pairs = match web::Query::<Vec<(String, String)>>::from_query(query) {
        Ok(pairs) => pairs.into_inner(),
        Err(e) => {
            tracing::debug!("Unparseable handshake query, connecting anonymously: {}", e);
            return None;
        }
    };

    pairs
        .into_iter()
        .find(|(key, _)| key == "userId")
        .and_then(|(_, value)| UserId::parse(&value))
}

/// Upgrade to a WebSocket session
///
/// Endpoint: GET /ws
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let user_id = handshake_user_id(req.query_string());

    let session = WsSession::new(user_id, state.presence.clone(), state.websocket);
    ws::start(session, &req, stream)
}

/// Get list of all online user IDs
///
/// Endpoint: GET /api/v1/ws/users
pub async fn list_online_users(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let users = state.presence.online_users();

    Ok(HttpResponse::Ok().json(json!({
        "count": users.len(),
        "users": users,
    })))
}

/// Get presence status for a user
///
/// Endpoint: GET /api/v1/ws/status/{user_id}
pub async fn ws_status(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let user_id = UserId::new(path.into_inner());

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user_id,
        "connected": state.presence.is_online(&user_id),
    })))
}

/// Get connection metrics
///
/// Endpoint: GET /api/v1/ws/metrics
pub async fn ws_metrics(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "connected_users": state.presence.online_users().len(),
        "endpoints": state.presence.endpoint_count(),
    })))
}

/// Register WebSocket routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_connect)).service(
        web::scope("/api/v1/ws")
            .route("/users", web::get().to(list_online_users))
            .route("/status/{user_id}", web::get().to(ws_status))
            .route("/metrics", web::get().to(ws_metrics)),
    );
}
