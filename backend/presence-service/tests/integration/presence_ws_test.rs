use awc::{ws, Client};
use futures_util::SinkExt;
use presence_service::websocket::NotificationKind;
use presence_service::OutboundEvent;
use serde_json::json;

use super::support::{
    expect_silence, next_event, roster, seeded_store, start_server, test_state, token_for,
};

#[actix_rt::test]
async fn users_see_each_other_come_and_go() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut a) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect A");
    assert_eq!(roster(next_event(&mut a).await), vec!["A"]);

    let (_resp, mut b) = client
        .ws(format!("http://{addr}/ws?userId=B"))
        .connect()
        .await
        .expect("connect B");
    assert_eq!(roster(next_event(&mut a).await), vec!["A", "B"]);
    assert_eq!(roster(next_event(&mut b).await), vec!["A", "B"]);

    a.send(ws::Message::Close(None)).await.expect("close A");
    drop(a);
    assert_eq!(roster(next_event(&mut b).await), vec!["B"]);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn reconnect_supersedes_and_stale_close_is_ignored() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut first) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect first");
    assert_eq!(roster(next_event(&mut first).await), vec!["A"]);

    let (_resp, mut second) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect second");
    assert_eq!(roster(next_event(&mut second).await), vec!["A"]);
    assert_eq!(roster(next_event(&mut first).await), vec!["A"]);

    let (_resp, mut b) = client
        .ws(format!("http://{addr}/ws?userId=B"))
        .connect()
        .await
        .expect("connect B");
    assert_eq!(roster(next_event(&mut b).await), vec!["A", "B"]);
    assert_eq!(roster(next_event(&mut second).await), vec!["A", "B"]);

    // The superseded socket closing must not take A offline
    first.send(ws::Message::Close(None)).await.expect("close first");
    drop(first);
    expect_silence(&mut b).await;

    let resp = client
        .get(format!("http://{addr}/api/v1/ws/status/A"))
        .send()
        .await
        .expect("status request")
        .json::<serde_json::Value>()
        .await
        .expect("status body");
    assert_eq!(resp["connected"], true);

    // Notifications follow the latest connection
    let resp = client
        .post(format!("http://{addr}/api/v1/post/postA/like"))
        .insert_header(("Authorization", format!("Bearer {}", token_for("B"))))
        .send()
        .await
        .expect("like request");
    assert!(resp.status().is_success());

    match next_event(&mut second).await {
        OutboundEvent::Notification(n) => {
            assert_eq!(n.kind, NotificationKind::Like);
            assert_eq!(n.user_id.as_str(), "B");
            assert_eq!(n.user_details.username, "bob");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    handle.stop(true).await;
}

#[actix_rt::test]
async fn anonymous_connection_receives_roster_without_joining() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut anon) = client
        .ws(format!("http://{addr}/ws"))
        .connect()
        .await
        .expect("connect anonymous");
    expect_silence(&mut anon).await;

    let (_resp, mut blank) = client
        .ws(format!("http://{addr}/ws?userId="))
        .connect()
        .await
        .expect("connect blank id");
    expect_silence(&mut anon).await;

    let (_resp, _a) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect A");
    assert_eq!(roster(next_event(&mut anon).await), vec!["A"]);
    assert_eq!(roster(next_event(&mut blank).await), vec!["A"]);

    let metrics = client
        .get(format!("http://{addr}/api/v1/ws/metrics"))
        .send()
        .await
        .expect("metrics request")
        .json::<serde_json::Value>()
        .await
        .expect("metrics body");
    assert_eq!(metrics["connected_users"], 1);
    assert_eq!(metrics["endpoints"], 3);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn comment_on_offline_author_pushes_nothing() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut b) = client
        .ws(format!("http://{addr}/ws?userId=B"))
        .connect()
        .await
        .expect("connect B");
    assert_eq!(roster(next_event(&mut b).await), vec!["B"]);

    let resp = client
        .post(format!("http://{addr}/api/v1/post/postC/comment"))
        .insert_header(("Authorization", format!("Bearer {}", token_for("B"))))
        .send_json(&json!({ "text": "great view" }))
        .await
        .expect("comment request");
    assert_eq!(resp.status().as_u16(), 201);

    expect_silence(&mut b).await;

    handle.stop(true).await;
}

#[actix_rt::test]
async fn direct_message_reaches_online_receiver() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut a) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect A");
    assert_eq!(roster(next_event(&mut a).await), vec!["A"]);

    let resp = client
        .post(format!("http://{addr}/api/v1/message/send/A"))
        .insert_header(("Authorization", format!("Bearer {}", token_for("B"))))
        .send_json(&json!({ "textMessage": "hey there" }))
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);

    match next_event(&mut a).await {
        OutboundEvent::NewMessage(m) => {
            assert_eq!(m.sender_id.as_str(), "B");
            assert_eq!(m.message, "hey there");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    handle.stop(true).await;
}

#[actix_rt::test]
async fn abrupt_disconnect_takes_user_offline() {
    let (addr, handle) = start_server(test_state(seeded_store()))
        .await
        .expect("start server");
    let client = Client::new();

    let (_resp, mut b) = client
        .ws(format!("http://{addr}/ws?userId=B"))
        .connect()
        .await
        .expect("connect B");
    assert_eq!(roster(next_event(&mut b).await), vec!["B"]);

    let (_resp, a) = client
        .ws(format!("http://{addr}/ws?userId=A"))
        .connect()
        .await
        .expect("connect A");
    assert_eq!(roster(next_event(&mut b).await), vec!["A", "B"]);

    // No close handshake: the TCP stream just goes away
    drop(a);
    assert_eq!(roster(next_event(&mut b).await), vec!["B"]);

    let status = client
        .get(format!("http://{addr}/api/v1/ws/status/A"))
        .send()
        .await
        .expect("status request")
        .json::<serde_json::Value>()
        .await
        .expect("status body");
    assert_eq!(status["connected"], false);

    handle.stop(true).await;
}
