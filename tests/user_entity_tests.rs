mod helpers;

use uuid::Uuid;

use baseconnect_server::{
    entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService},
    middleware::{
        ctx::Ctx,
        error::AppError,
        utils::{db_utils::IdentIdName, string_utils::get_string_thing},
    },
};
use helpers::create_test_server;

fn guest_ctx() -> Ctx {
    Ctx::new(Err(AppError::AuthFailNoBearerToken), Uuid::new_v4())
}

// email-only and wallet-only accounts both leave optional columns unset
#[tokio::test]
async fn users_with_unset_optional_columns_are_created() {
    let t = create_test_server().await;
    let ctx = guest_ctx();
    let users = LocalUserDbService {
        db: &t.state.db.client,
        ctx: &ctx,
    };

    let email_only = LocalUser {
        email: Some("someone@example.com".to_string()),
        password_hash: Some("not-a-real-hash".to_string()),
        referral_code: Some("ref-email".to_string()),
        ..Default::default()
    };
    let id = users.create(email_only).await.expect("email-only create");
    let stored = users
        .get(IdentIdName::Id(get_string_thing(id).expect("thing")))
        .await
        .expect("email-only get");
    assert_eq!(stored.email.as_deref(), Some("someone@example.com"));
    assert!(stored.wallet_address.is_none());

    let wallet_only = LocalUser {
        wallet_address: Some("0x52908400098527886e0f7030069857d2e4169ee7".to_string()),
        referral_code: Some("ref-wallet".to_string()),
        ..Default::default()
    };
    let id = users.create(wallet_only).await.expect("wallet-only create");
    let stored = users
        .get(IdentIdName::Id(get_string_thing(id).expect("thing")))
        .await
        .expect("wallet-only get");
    assert!(stored.email.is_none());
    assert_eq!(
        stored.wallet_address.as_deref(),
        Some("0x52908400098527886e0f7030069857d2e4169ee7")
    );
}

#[tokio::test]
async fn full_record_update_keeps_created_timestamp() {
    let t = create_test_server().await;
    let ctx = guest_ctx();
    let users = LocalUserDbService {
        db: &t.state.db.client,
        ctx: &ctx,
    };

    let id = users
        .create(LocalUser {
            email: Some("timestamps@example.com".to_string()),
            password_hash: Some("not-a-real-hash".to_string()),
            referral_code: Some("ref-ts".to_string()),
            ..Default::default()
        })
        .await
        .expect("create");
    let stored = users
        .get(IdentIdName::Id(get_string_thing(id).expect("thing")))
        .await
        .expect("get");
    let created_at = stored.r_created;
    assert!(created_at.is_some());

    let mut user = stored;
    user.full_name = Some("Ada".to_string());
    let updated = users.update(user).await.expect("update");
    assert_eq!(updated.full_name.as_deref(), Some("Ada"));
    assert_eq!(updated.email.as_deref(), Some("timestamps@example.com"));
    assert_eq!(updated.r_created, created_at);
}
