/// HTTP handlers for the presence service API
pub mod interactions;
pub mod websocket;

pub use interactions::register_routes as register_interactions;
pub use websocket::register_routes as register_websocket;
