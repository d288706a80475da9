mod common;

use axum::http::StatusCode;

use common::{TestClient, seed};

#[tokio::test]
async fn add_message() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.get("/messages/new").await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = client.post("/messages/new", &[("text", "Hello")]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location, Some(format!("/users/{}", s.user1.id)));

    let newest = client.db().messages(s.user1.id, 1).unwrap();
    assert_eq!(newest[0].text, "Hello");
}

#[tokio::test]
async fn overlong_message_rerenders_form() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let text = "x".repeat(141);
    let resp = client.post("/messages/new", &[("text", &text)]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("140"));
    assert_eq!(client.db().messages(s.user1.id, 10).unwrap().len(), 1);

    let resp = client.post("/messages/new", &[("text", "   ")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(client.db().messages(s.user1.id, 10).unwrap().len(), 1);
}

#[tokio::test]
async fn anonymous_add_is_refused() {
    let mut client = TestClient::new();
    let s = seed(client.db());

    let resp = client
        .post_follow("/messages/new", &[("text", "Hello")])
        .await;
    assert!(resp.body.contains("Access unauthorized."));
    assert_eq!(client.db().messages(s.user1.id, 10).unwrap().len(), 1);
}

#[tokio::test]
async fn show_own_message() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.get(&format!("/messages/{}", s.message1.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Test Message 1"));
    assert!(resp.body.contains(&format!("/messages/{}/delete", s.message1.id)));
}

#[tokio::test]
async fn show_someone_elses_message() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.get(&format!("/messages/{}", s.message2.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Test Message 2"));
    assert!(resp.body.contains("@testuser2"));
    assert!(!resp.body.contains("/delete\""));
    assert!(resp.body.contains(&format!("/users/toggle_like/{}", s.message2.id)));
}

#[tokio::test]
async fn missing_message_is_404() {
    let mut client = TestClient::new();
    seed(client.db());

    let resp = client.get("/messages/99999").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = client.get("/messages/abc").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_own_message() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client
        .post(&format!("/messages/{}/delete", s.message1.id), &[])
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location, Some(format!("/users/{}", s.user1.id)));
    assert!(client.db().get_message(s.message1.id).unwrap().is_none());
}

#[tokio::test]
async fn delete_with_bad_id_is_404() {
    let mut client = TestClient::new();
    seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.post("/messages/abc/delete", &[]).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_someone_elses_message_is_refused() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client
        .post_follow(&format!("/messages/{}/delete", s.message2.id), &[])
        .await;
    assert!(resp.body.contains("Access unauthorized."));
    assert!(client.db().get_message(s.message2.id).unwrap().is_some());
}

#[tokio::test]
async fn anonymous_delete_is_refused() {
    let mut client = TestClient::new();
    let s = seed(client.db());

    let resp = client
        .post_follow(&format!("/messages/{}/delete", s.message1.id), &[])
        .await;
    assert!(resp.body.contains("Access unauthorized."));
    assert!(client.db().get_message(s.message1.id).unwrap().is_some());
}

#[tokio::test]
async fn timeline_shows_followed_users() {
    let mut client = TestClient::new();
    let s = seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.get("/").await;
    assert!(resp.body.contains("Test Message 1"));
    assert!(!resp.body.contains("Test Message 2"));

    client.post(&format!("/users/follow/{}", s.user2.id), &[]).await;
    let resp = client.get("/").await;
    assert!(resp.body.contains("Test Message 2"));
    assert!(resp.body.contains("Test Message 3"));
}
