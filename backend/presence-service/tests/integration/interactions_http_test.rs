use actix_web::{cookie::Cookie, test, web, App};
use presence_service::handlers::{register_interactions, register_websocket};
use presence_service::middleware::JwtValidator;
use presence_service::models::{PostId, UserId};
use presence_service::InMemoryStore;
use serde_json::{json, Value};

use super::support::{seeded_store, test_state, token_for, SECRET};

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_state($store)))
                .app_data(web::Data::new(JwtValidator::new(SECRET)))
                .configure(register_websocket)
                .configure(register_interactions),
        )
        .await
    };
}

#[actix_rt::test]
async fn like_requires_authentication() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/post/postA/like")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn like_with_cookie_commits() {
    let store = seeded_store();
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/api/v1/post/postA/like")
        .cookie(Cookie::new("token", token_for("B")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "message": "Post liked", "success": true }));

    let post = store_post(&store, "postA").await;
    assert!(post.likes.contains(&UserId::new("B")));
}

#[actix_rt::test]
async fn missing_post_is_not_found() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/post/nope/dislike")
        .cookie(Cookie::new("token", token_for("B")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post not found");
}

#[actix_rt::test]
async fn blank_comment_is_rejected() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/post/postA/comment")
        .cookie(Cookie::new("token", token_for("B")))
        .set_json(json!({ "text": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn comment_returns_author_snapshot() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/post/postA/comment")
        .cookie(Cookie::new("token", token_for("B")))
        .set_json(json!({ "text": "nice shot" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["comment"]["text"], "nice shot");
    assert_eq!(body["comment"]["author"]["username"], "bob");
}

#[actix_rt::test]
async fn follow_toggles_and_rejects_self() {
    let store = seeded_store();
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/api/v1/user/followorunfollow/A")
        .cookie(Cookie::new("token", token_for("B")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "followed successfully");
    assert!(store.followers_of(&UserId::new("A")).contains(&UserId::new("B")));

    let req = test::TestRequest::post()
        .uri("/api/v1/user/followorunfollow/A")
        .cookie(Cookie::new("token", token_for("B")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Unfollowed successfully");

    let req = test::TestRequest::post()
        .uri("/api/v1/user/followorunfollow/B")
        .cookie(Cookie::new("token", token_for("B")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn bearer_header_is_accepted() {
    let store = seeded_store();
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/api/v1/message/send/A")
        .insert_header(("Authorization", format!("Bearer {}", token_for("B"))))
        .set_json(json!({ "textMessage": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    assert_eq!(store.message_count(), 1);
}

async fn store_post(store: &InMemoryStore, id: &str) -> presence_service::models::Post {
    use presence_service::SocialStore;
    store.find_post(&PostId::new(id)).await.expect("post exists")
}
