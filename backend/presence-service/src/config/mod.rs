use crate::error::AppError;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub cors_origin: String,
    /// JSON file of users and posts loaded into the in-memory store
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity layer that issues session tokens
    pub jwt_secret: String,
}

/// Heartbeat settings for WebSocket sessions
#[derive(Debug, Clone, Copy)]
pub struct WebSocketConfig {
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            port: parse_or("PORT", 8080)?,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            seed_file: env::var("SEED_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        if jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET must not be empty".into()));
        }

        let websocket = WebSocketConfig {
            heartbeat_interval: Duration::from_secs(parse_or("WS_HEARTBEAT_INTERVAL_SECS", 5)?),
            client_timeout: Duration::from_secs(parse_or("WS_CLIENT_TIMEOUT_SECS", 30)?),
        };
        websocket.validate()?;

        Ok(Self {
            app,
            auth: AuthConfig { jwt_secret },
            websocket,
        })
    }
}

impl WebSocketConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.heartbeat_interval.is_zero() {
            return Err(AppError::Config(
                "WS_HEARTBEAT_INTERVAL_SECS must be greater than 0".into(),
            ));
        }
        if self.client_timeout <= self.heartbeat_interval {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }
        Ok(())
    }
}
