mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{create_test_server, fake_email, signup_user, TEST_PASSWORD};

#[tokio::test]
async fn wallet_can_only_link_to_one_account() {
    let t = create_test_server().await;
    let (first_token, _) = signup_user(&t.server, &fake_email()).await;
    let (second_token, _) = signup_user(&t.server, &fake_email()).await;
    let address = "0x52908400098527886E0F7030069857D2E4169EE7";

    let res = t
        .server
        .post("/api/profile/wallet")
        .authorization_bearer(&first_token)
        .json(&json!({ "wallet_address": address }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(
        body["wallet_address"].as_str().unwrap(),
        address.to_lowercase()
    );

    // relinking your own wallet is fine
    t.server
        .post("/api/profile/wallet")
        .authorization_bearer(&first_token)
        .json(&json!({ "wallet_address": address }))
        .await
        .assert_status_ok();

    let res = t
        .server
        .post("/api/profile/wallet")
        .authorization_bearer(&second_token)
        .json(&json!({ "wallet_address": address }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn social_link_replaces_same_platform() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    t.server
        .post("/api/profile/social")
        .authorization_bearer(&token)
        .json(&json!({ "platform": "twitter", "username": "old_handle" }))
        .await
        .assert_status_ok();

    let res = t
        .server
        .post("/api/profile/social")
        .authorization_bearer(&token)
        .json(&json!({ "platform": "twitter", "username": "new_handle" }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let links = body["social_links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["username"], "new_handle");
    assert_eq!(links[0]["verified"], false);

    let res = t
        .server
        .post("/api/profile/social")
        .authorization_bearer(&token)
        .json(&json!({ "platform": "myspace", "username": "nope" }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn follow_rules() {
    let t = create_test_server().await;
    let (token, me) = signup_user(&t.server, &fake_email()).await;
    let (_, other) = signup_user(&t.server, &fake_email()).await;
    let my_id = me.id.to_raw();
    let other_id = other.id.to_raw();

    let res = t
        .server
        .post(&format!("/api/profile/follow/{my_id}"))
        .authorization_bearer(&token)
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);

    t.server
        .post(&format!("/api/profile/follow/{other_id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let res = t
        .server
        .post(&format!("/api/profile/follow/{other_id}"))
        .authorization_bearer(&token)
        .await;
    res.assert_status(StatusCode::CONFLICT);

    let res = t
        .server
        .get("/api/profile/following")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    let following: serde_json::Value = res.json();
    assert_eq!(following.as_array().unwrap().len(), 1);

    // counts show up on the public profile
    let res = t.server.get(&format!("/api/profile/{other_id}")).await;
    res.assert_status_ok();
    let profile: serde_json::Value = res.json();
    assert_eq!(profile["followers_count"], 1);
    assert_eq!(profile["following_count"], 0);

    t.server
        .delete(&format!("/api/profile/follow/{other_id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let res = t
        .server
        .delete(&format!("/api/profile/follow/{other_id}"))
        .authorization_bearer(&token)
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn referral_signup_credits_the_referrer() {
    let t = create_test_server().await;
    let (token, me) = signup_user(&t.server, &fake_email()).await;
    let code = me.referral_code.clone().unwrap();

    let res = t
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "email": fake_email(),
            "password": TEST_PASSWORD,
            "referral_code": code
        }))
        .await;
    res.assert_status_ok();

    let res = t
        .server
        .get("/api/profile/referral")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    let info: serde_json::Value = res.json();
    assert_eq!(info["referral_code"].as_str().unwrap(), code);
    assert_eq!(info["referral_count"], 1);
    assert_eq!(info["referral_level"], 1);
}

#[tokio::test]
async fn unknown_referral_code_is_ignored() {
    let t = create_test_server().await;
    let res = t
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "email": fake_email(),
            "password": TEST_PASSWORD,
            "referral_code": "NOSUCH00"
        }))
        .await;
    res.assert_status_ok();
}

#[tokio::test]
async fn badges_claim_once() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let res = t
        .server
        .post("/api/profile/badges")
        .authorization_bearer(&token)
        .json(&json!({ "badge_id": "early-adopter" }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    let badges = body["badges"].as_array().unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0]["badge_id"], "early-adopter");

    let res = t
        .server
        .post("/api/profile/badges")
        .authorization_bearer(&token)
        .json(&json!({ "badge_id": "early-adopter" }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn own_profile_has_counts() {
    let t = create_test_server().await;
    let (token, _) = signup_user(&t.server, &fake_email()).await;

    let res = t
        .server
        .get("/api/profile")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    let profile: serde_json::Value = res.json();
    assert_eq!(profile["followers_count"], 0);
    assert_eq!(profile["following_count"], 0);
    assert!(profile["referral_code"].as_str().is_some());
}
