use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    database::client::Db,
    entities::{
        task::{
            application_entity::ApplicationDbService, submission_entity::SubmissionDbService,
            task_entity::TaskDbService,
        },
        user_auth::{
            follow_entity::FollowDbService, local_user_entity::LocalUserDbService,
            verification_code_entity::VerificationCodeDbService,
            wallet_nonce_entity::WalletNonceDbService,
        },
        waitlist::{
            quest_progress_entity::QuestProgressDbService,
            waitlist_task_entity::{self, WaitlistTaskDbService},
        },
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, AppResult},
        mw_ctx::CtxState,
    },
    routes::{auth_routes, profile_routes, task_routes, waitlist_routes},
};

pub async fn run_migrations(db: &Db) -> AppResult<()> {
    let c = Ctx::new(Err(AppError::AuthFailNoBearerToken), Uuid::new_v4());

    LocalUserDbService { db, ctx: &c }.mutate_db().await?;
    FollowDbService { db, ctx: &c }.mutate_db().await?;
    WalletNonceDbService { db, ctx: &c }.mutate_db().await?;
    VerificationCodeDbService { db, ctx: &c }.mutate_db().await?;
    TaskDbService { db, ctx: &c }.mutate_db().await?;
    ApplicationDbService { db, ctx: &c }.mutate_db().await?;
    SubmissionDbService { db, ctx: &c }.mutate_db().await?;
    WaitlistTaskDbService { db, ctx: &c }.mutate_db().await?;
    QuestProgressDbService { db, ctx: &c }.mutate_db().await?;

    Ok(())
}

pub async fn seed_waitlist(db: &Db) -> AppResult<()> {
    let c = Ctx::new(Err(AppError::AuthFailNoBearerToken), Uuid::new_v4());
    WaitlistTaskDbService { db, ctx: &c }
        .seed(waitlist_task_entity::default_catalog())
        .await
        .map_err(|e| e.error)?;
    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(healthcheck))
        .merge(auth_routes::routes())
        .merge(task_routes::routes())
        .merge(waitlist_routes::routes())
        .merge(profile_routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx_state.clone())
}

async fn healthcheck() -> &'static str {
    "ok"
}
