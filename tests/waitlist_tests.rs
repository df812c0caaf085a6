mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{create_test_server, fake_email, signup_user, TestCtx};

#[tokio::test]
async fn catalog_is_seeded() {
    let t = create_test_server().await;
    let res = t.server.get("/api/waitlist/tasks").await;
    res.assert_status_ok();
    let entries: serde_json::Value = res.json();
    let list = entries.as_array().unwrap();
    assert_eq!(list.len(), 9);
    let ids: Vec<&str> = list
        .iter()
        .map(|e| e["task_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"createProfile"));
    assert!(ids.contains(&"followCount"));
    assert!(ids.contains(&"partnerQuest"));
}

async fn verify_quest(t: &TestCtx, token: &str, task_id: &str) -> serde_json::Value {
    let res = t
        .server
        .post(&format!("/api/waitlist/tasks/{task_id}/verify"))
        .authorization_bearer(token)
        .await;
    res.assert_status_ok();
    res.json()
}

#[tokio::test]
async fn follow_quest_tracks_partial_progress() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let mut targets = vec![];
    for _ in 0..5 {
        let (_, user) = signup_user(&t.server, &fake_email()).await;
        targets.push(user.id.to_raw());
    }

    for target in &targets[..3] {
        t.server
            .post(&format!("/api/profile/follow/{target}"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    let progress = verify_quest(&t, &token, "followCount").await;
    assert_eq!(progress["status"], "in_progress");
    assert_eq!(progress["progress"], 60);

    for target in &targets[3..] {
        t.server
            .post(&format!("/api/profile/follow/{target}"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    let progress = verify_quest(&t, &token, "followCount").await;
    assert_eq!(progress["status"], "completed");
    assert_eq!(progress["progress"], 100);
    assert!(progress["completed_at"].as_str().is_some());
}

#[tokio::test]
async fn profile_quest_completes_after_profile_setup() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let before = verify_quest(&t, &token, "createProfile").await;
    assert_eq!(before["status"], "not_started");
    assert_eq!(before["progress"], 0);

    t.server
        .post("/api/auth/profile")
        .authorization_bearer(&token)
        .json(&json!({ "role": "contributor", "full_name": "Quester" }))
        .await
        .assert_status_ok();

    let after = verify_quest(&t, &token, "createProfile").await;
    assert_eq!(after["status"], "completed");
    assert_eq!(after["progress"], 100);
}

#[tokio::test]
async fn interest_quest_uses_ratio() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    t.server
        .put("/api/profile/interests")
        .authorization_bearer(&token)
        .json(&json!({ "interests": ["defi"] }))
        .await
        .assert_status_ok();

    let progress = verify_quest(&t, &token, "interestGraphComplete").await;
    assert_eq!(progress["status"], "in_progress");
    assert_eq!(progress["progress"], 33);

    t.server
        .put("/api/profile/interests")
        .authorization_bearer(&token)
        .json(&json!({ "interests": ["defi", "nfts", "gaming"] }))
        .await
        .assert_status_ok();

    let progress = verify_quest(&t, &token, "interestGraphComplete").await;
    assert_eq!(progress["status"], "completed");
}

#[tokio::test]
async fn overall_progress_counts_completed_quests() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    t.server
        .post("/api/auth/profile")
        .authorization_bearer(&token)
        .json(&json!({ "role": "contributor" }))
        .await
        .assert_status_ok();
    verify_quest(&t, &token, "createProfile").await;

    let res = t
        .server
        .get("/api/waitlist/progress")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["total_count"], 9);
    assert_eq!(body["completed_count"], 1);
    // 1 of 9 rounds to 11
    assert_eq!(body["overall_progress"], 11);

    let quests = body["quests"].as_array().unwrap();
    let partner = quests
        .iter()
        .find(|q| q["task_id"] == "partnerQuest")
        .unwrap();
    assert_eq!(partner["status"], "not_started");
}

#[tokio::test]
async fn partner_quest_never_completes() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let progress = verify_quest(&t, &token, "partnerQuest").await;
    assert_eq!(progress["status"], "not_started");
    assert_eq!(progress["progress"], 0);
}

#[tokio::test]
async fn unknown_quest_is_not_found() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let res = t
        .server
        .post("/api/waitlist/tasks/doesNotExist/verify")
        .authorization_bearer(&token)
        .await;
    res.assert_status(StatusCode::NOT_FOUND);
}
