use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Duration;
use fake::{faker::internet::en::FreeEmail, Fake};
use serde_json::json;

use baseconnect_server::{
    database::client::{Database, DbConfig},
    init,
    interfaces::send_email::SendEmailInterface,
    middleware::mw_ctx::CtxState,
    models::view::user::UserView,
    utils::jwt::JWT,
};

pub struct NoopEmailSender;

#[async_trait]
impl SendEmailInterface for NoopEmailSender {
    async fn send(&self, _emails: Vec<String>, _body: &str, _subject: &str) -> Result<(), String> {
        Ok(())
    }
}

pub struct TestCtx {
    pub server: TestServer,
    pub state: Arc<CtxState>,
}

pub async fn create_test_server() -> TestCtx {
    let db = Database::connect(DbConfig {
        url: "mem://",
        database: "test",
        namespace: "test",
        username: None,
        password: None,
    })
    .await;
    init::run_migrations(&db.client).await.expect("migrations");
    init::seed_waitlist(&db.client).await.expect("waitlist seed");

    let state = Arc::new(CtxState {
        db,
        is_development: true,
        jwt: JWT::new("test-secret".to_string(), Duration::days(7)),
        email_sender: Arc::new(NoopEmailSender),
        verification_code_ttl: Duration::minutes(10),
        wallet_nonce_ttl: Duration::minutes(5),
        platform_fee_rate: 0.10,
    });

    let server = TestServer::new(init::main_router(&state)).expect("test server");
    TestCtx { server, state }
}

pub fn fake_email() -> String {
    FreeEmail().fake::<String>()
}

pub const TEST_PASSWORD: &str = "password1";

pub async fn signup_user(server: &TestServer, email: &str) -> (String, UserView) {
    let res = server
        .post("/api/auth/signup")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let token = body["token"].as_str().expect("token").to_string();
    let user: UserView = serde_json::from_value(body["user"].clone()).expect("user view");
    (token, user)
}

/// Signup plus role selection, returns a session ready for task endpoints.
pub async fn create_role_user(server: &TestServer, role: &str) -> (String, UserView) {
    let (token, _) = signup_user(server, &fake_email()).await;
    let res = server
        .post("/api/auth/profile")
        .authorization_bearer(&token)
        .json(&json!({ "role": role, "full_name": "Test User" }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let token = body["token"].as_str().expect("token").to_string();
    let user: UserView = serde_json::from_value(body["user"].clone()).expect("user view");
    (token, user)
}
