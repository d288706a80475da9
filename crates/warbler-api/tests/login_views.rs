mod common;

use axum::http::StatusCode;

use common::{TestClient, seed};

#[tokio::test]
async fn signup_form_lists_fields() {
    let mut client = TestClient::new();
    let resp = client.get("/signup").await;

    assert_eq!(resp.status, StatusCode::OK);
    for label in ["Username", "E-mail", "Password", "Image URL", "Header Image URL", "Bio"] {
        assert!(resp.body.contains(label), "missing {label}");
    }
}

#[tokio::test]
async fn signup_logs_new_user_in() {
    let mut client = TestClient::new();
    seed(client.db());

    let resp = client
        .post(
            "/signup",
            &[
                ("username", "testuser4"),
                ("password", "password"),
                ("email", "testuser4@test.com"),
                ("image_url", "test_image.png"),
                ("header_image_url", "test_header_image.png"),
                ("bio", "test bio"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("testuser4"));
    assert!(resp.body.contains("test_image.png"));
    assert!(resp.body.contains("test_header_image.png"));

    let stored = client
        .db()
        .get_user_by_username("testuser4")
        .unwrap()
        .unwrap();
    assert_ne!(stored.password, "password");
    assert_eq!(stored.bio.as_deref(), Some("test bio"));
}

#[tokio::test]
async fn signup_with_taken_username_rerenders_form() {
    let mut client = TestClient::new();
    seed(client.db());

    let resp = client
        .post(
            "/signup",
            &[
                ("username", "testuser1"),
                ("password", "password"),
                ("email", "new@test.com"),
            ],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username already taken"));
    assert_eq!(client.db().list_users(None).unwrap().len(), 3);
}

#[tokio::test]
async fn signup_with_short_password_is_rejected() {
    let mut client = TestClient::new();

    let form = [
        ("username", "shorty"),
        ("password", "abc"),
        ("email", "s@test.com"),
    ];
    let resp = client.post("/signup", &form).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("at least 6 characters"));
    assert!(
        client
            .db()
            .get_user_by_username("shorty")
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn login_greets_user() {
    let mut client = TestClient::new();
    seed(client.db());

    let resp = client
        .post_follow(
            "/login",
            &[("username", "testuser1"), ("password", "testuser")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Hello, testuser1!"));
    assert!(resp.body.contains("Test Message 1"));
}

#[tokio::test]
async fn login_with_bad_password_fails_softly() {
    let mut client = TestClient::new();
    seed(client.db());

    let resp = client
        .post(
            "/login",
            &[("username", "testuser1"), ("password", "wrong")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid credentials."));

    // Still anonymous
    let resp = client.get("/").await;
    assert!(resp.body.contains("New to Warbler?"));
}

#[tokio::test]
async fn logout_ends_session() {
    let mut client = TestClient::new();
    seed(client.db());
    client.login("testuser1", "testuser").await;

    let resp = client.post("/logout", &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/login"));

    let resp = client.get("/login").await;
    assert!(resp.body.contains("You have successfully logged out."));

    let resp = client.get_follow("/messages/new").await;
    assert!(resp.body.contains("Access unauthorized."));
}
