pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::{InMemoryStore, InteractionService, SocialStore};
pub use state::AppState;
pub use websocket::{
    ConnectionHandle, ConnectionRegistry, NotificationEvent, NotificationRouter, OutboundEvent,
    PresenceCoordinator,
};
