/// HTTP endpoints for likes, comments, follows and direct messages
///
/// Each handler commits through `InteractionService`; realtime delivery is a
/// side effect that never changes the response.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;
use crate::models::{FollowChange, PostId, UserId};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "textMessage", default)]
    pub text_message: String,
}

/// Endpoint: POST /api/v1/post/{id}/like
pub async fn like_post(
    user: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    state.interactions.like_post(&user.0, &post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Post liked",
        "success": true,
    })))
}

/// Endpoint: POST /api/v1/post/{id}/dislike
pub async fn dislike_post(
    user: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let post = state.interactions.dislike_post(&user.0, &post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Post disliked",
        "post": post,
        "success": true,
    })))
}

/// Endpoint: POST /api/v1/post/{id}/comment
pub async fn add_comment(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let comment = state
        .interactions
        .add_comment(&user.0, &post_id, &body.text)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Comment Added",
        "comment": comment,
        "success": true,
    })))
}

/// Endpoint: POST /api/v1/user/followorunfollow/{id}
pub async fn follow_or_unfollow(
    user: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let target = UserId::new(path.into_inner());
    let change = state
        .interactions
        .follow_or_unfollow(&user.0, &target)
        .await?;

    let message = match change {
        FollowChange::Followed => "followed successfully",
        FollowChange::Unfollowed => "Unfollowed successfully",
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "success": true,
    })))
}

/// Endpoint: POST /api/v1/message/send/{id}
pub async fn send_message(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<SendMessageRequest>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let receiver = UserId::new(path.into_inner());
    let message = state
        .interactions
        .send_message(&user.0, &receiver, &body.text_message)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "newMessage": message,
    })))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/post")
            .route("/{id}/like", web::post().to(like_post))
            .route("/{id}/dislike", web::post().to(dislike_post))
            .route("/{id}/comment", web::post().to(add_comment)),
    )
    .service(
        web::scope("/api/v1/user")
            .route("/followorunfollow/{id}", web::post().to(follow_or_unfollow)),
    )
    .service(web::scope("/api/v1/message").route("/send/{id}", web::post().to(send_message)));
}
