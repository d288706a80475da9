#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::{AppState, AppStateInner};
use warbler_db::{Database, MessageRow, NewMessage, NewUser, UserRow};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the router in-process, carrying the session cookie between requests
/// the way a browser would.
pub struct TestClient {
    pub state: AppState,
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let state = AppStateInner::new(Database::open_in_memory().expect("in-memory db"));
        let app = warbler_api::app(state.clone(), time::Duration::minutes(5));
        Self {
            state,
            app,
            cookie: None,
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = Request::builder().method("GET").uri(uri);
        self.send(req, Body::empty()).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(req, Body::from(encode_form(form))).await
    }

    /// POST, then follow any redirects with GETs.
    pub async fn post_follow(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let resp = self.post(uri, form).await;
        self.follow_redirects(resp).await
    }

    pub async fn get_follow(&mut self, uri: &str) -> TestResponse {
        let resp = self.get(uri).await;
        self.follow_redirects(resp).await
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        let form = [("username", username), ("password", password)];
        let resp = self.post("/login", &form).await;
        assert_eq!(resp.status, StatusCode::FOUND, "login as {username} failed");
    }

    async fn follow_redirects(&mut self, mut resp: TestResponse) -> TestResponse {
        for _ in 0..5 {
            if !resp.status.is_redirection() {
                break;
            }
            let location = resp.location.clone().expect("redirect without location");
            resp = self.get(&location).await;
        }
        resp
    }

    async fn send(&mut self, mut req: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = self
            .app
            .clone()
            .oneshot(req.body(body).expect("request"))
            .await
            .expect("infallible");

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().expect("ascii cookie");
            let pair = value.split(';').next().unwrap_or_default().trim().to_string();
            if value.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = Some(pair);
            }
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().expect("ascii location").to_string());
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).expect("utf8 body"),
        }
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(raw: &str) -> String {
    let mut out = String::new();
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub struct Seed {
    pub user1: UserRow,
    pub user2: UserRow,
    pub user3: UserRow,
    pub message1: MessageRow,
    pub message2: MessageRow,
    pub message3: MessageRow,
}

/// Three users (password = "testuser", "testuser2", "testuser3") and three
/// messages: one by testuser1, two by testuser2.
pub fn seed(db: &Database) -> Seed {
    let signup = |username: &str, email: &str, password: &str| {
        db.signup(&NewUser {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        })
        .expect("seed user")
    };
    let user1 = signup("testuser1", "test@test.com", "testuser");
    let user2 = signup("testuser2", "test2@test.com", "testuser2");
    let user3 = signup("testuser3", "test3@test.com", "testuser3");

    let post = |user: &UserRow, text: &str| {
        db.insert_message(&NewMessage {
            text: text.into(),
            user_id: user.id,
            timestamp: None,
        })
        .expect("seed message")
    };
    let message1 = post(&user1, "Test Message 1");
    let message2 = post(&user2, "Test Message 2");
    let message3 = post(&user2, "Test Message 3");

    Seed {
        user1,
        user2,
        user3,
        message1,
        message2,
        message3,
    }
}
