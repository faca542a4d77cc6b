//! Identity resolution for HTTP handlers
//!
//! Session tokens are issued by the identity layer as HS256 JWTs carrying a
//! `userId` claim. They arrive in the `token` cookie or as a Bearer header.

use crate::error::AppError;
use crate::models::UserId;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
    exp: i64,
}

/// Verifies session tokens against the shared secret
#[derive(Clone)]
pub struct JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn validate(&self, token: &str) -> Result<UserId, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Token validation failed: {}", e);
            AppError::Unauthorized
        })?;
        UserId::parse(&data.claims.user_id).ok_or(AppError::Unauthorized)
    }

    /// Sign a token the same way the identity layer does
    pub fn issue(&self, user_id: &UserId, ttl_secs: i64) -> Result<String, AppError> {
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }
}

fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// The caller's identity, resolved from their session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(validator) = req.app_data::<web::Data<JwtValidator>>() else {
            tracing::error!("JwtValidator missing from app data");
            return ready(Err(AppError::Internal("auth not configured".into())));
        };

        let result = match extract_token(req) {
            Some(token) => validator.validate(&token).map(AuthenticatedUser),
            None => Err(AppError::Unauthorized),
        };
        ready(result)
    }
}
