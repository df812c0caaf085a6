use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};

use crate::{
    middleware::{
        bearer_auth::BearerAuth,
        ctx::Ctx,
        error::CtxResult,
        mw_ctx::CtxState,
        utils::extractor_utils::JsonValidated,
    },
    models::view::user::{ProfileView, UserView},
    services::user_service::{
        BadgeClaimInput, InterestsInput, ReferralInfoView, SocialLinkInput, UserService,
        WalletLinkInput,
    },
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/profile", get(own_profile))
        .route("/api/profile/referral", get(referral_info))
        .route("/api/profile/wallet", post(link_wallet))
        .route("/api/profile/social", post(add_social))
        .route("/api/profile/interests", put(set_interests))
        .route(
            "/api/profile/follow/:user_id",
            post(follow).delete(unfollow),
        )
        .route("/api/profile/following", get(following))
        .route("/api/profile/badges", post(claim_badge))
        .route("/api/profile/:user_id", get(user_profile))
}

async fn own_profile(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
) -> CtxResult<Json<ProfileView>> {
    let profile = UserService::new(&state, &auth.ctx).get_profile(None).await?;
    Ok(Json(profile))
}

async fn user_profile(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<Json<ProfileView>> {
    let profile = UserService::new(&state, &ctx)
        .get_profile(Some(&user_id))
        .await?;
    Ok(Json(profile))
}

async fn link_wallet(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<WalletLinkInput>,
) -> CtxResult<Json<UserView>> {
    let user = UserService::new(&state, &auth.ctx).link_wallet(input).await?;
    Ok(Json(UserView::from(user)))
}

async fn add_social(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<SocialLinkInput>,
) -> CtxResult<Json<UserView>> {
    let user = UserService::new(&state, &auth.ctx)
        .add_social_link(input)
        .await?;
    Ok(Json(UserView::from(user)))
}

async fn set_interests(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<InterestsInput>,
) -> CtxResult<Json<UserView>> {
    let user = UserService::new(&state, &auth.ctx)
        .set_interests(input)
        .await?;
    Ok(Json(UserView::from(user)))
}

async fn follow(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(user_id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    UserService::new(&state, &auth.ctx).follow(&user_id).await?;
    Ok(Json(serde_json::json!({ "following": true })))
}

async fn unfollow(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(user_id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    UserService::new(&state, &auth.ctx).unfollow(&user_id).await?;
    Ok(Json(serde_json::json!({ "following": false })))
}

async fn following(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
) -> CtxResult<Json<Vec<UserView>>> {
    let users = UserService::new(&state, &auth.ctx).following().await?;
    Ok(Json(users))
}

async fn referral_info(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
) -> CtxResult<Json<ReferralInfoView>> {
    let info = UserService::new(&state, &auth.ctx).referral_info().await?;
    Ok(Json(info))
}

async fn claim_badge(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<BadgeClaimInput>,
) -> CtxResult<Json<UserView>> {
    let user = UserService::new(&state, &auth.ctx).claim_badge(input).await?;
    Ok(Json(UserView::from(user)))
}
