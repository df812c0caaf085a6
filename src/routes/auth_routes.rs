use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{
    entities::user_auth::local_user_entity::LocalUserDbService,
    middleware::{
        bearer_auth::BearerAuth,
        ctx::Ctx,
        error::CtxResult,
        mw_ctx::CtxState,
        utils::extractor_utils::JsonValidated,
    },
    models::view::user::UserView,
    services::auth_service::{
        AuthService, CompleteProfileInput, ForgotPasswordInput, LoginInput, ResetPasswordInput,
        SignupInput, VerifyOtpInput, WalletRequestInput, WalletVerifyInput, NONCE_MESSAGE_PREFIX,
    },
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", post(complete_profile))
        .route("/api/auth/me", get(me))
        .route("/api/auth/wallet/request", post(wallet_request))
        .route("/api/auth/wallet/verify", post(wallet_verify))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/resend-otp", post(resend_otp))
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct WalletChallengeResponse {
    pub nonce: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OtpVerifiedResponse {
    pub message: String,
    pub otp_token: String,
}

async fn signup(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<SignupInput>,
) -> CtxResult<Json<AuthResponse>> {
    let (token, user) = AuthService::new(&state, &ctx).signup(input).await?;
    Ok(Json(AuthResponse {
        token,
        user: UserView::from(user),
    }))
}

async fn login(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<LoginInput>,
) -> CtxResult<Json<AuthResponse>> {
    let (token, user) = AuthService::new(&state, &ctx).login(input).await?;
    Ok(Json(AuthResponse {
        token,
        user: UserView::from(user),
    }))
}

async fn complete_profile(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<CompleteProfileInput>,
) -> CtxResult<Json<AuthResponse>> {
    let (token, user) = AuthService::new(&state, &auth.ctx)
        .complete_profile(input)
        .await?;
    Ok(Json(AuthResponse {
        token,
        user: UserView::from(user),
    }))
}

async fn me(State(state): State<Arc<CtxState>>, auth: BearerAuth) -> CtxResult<Json<UserView>> {
    let users = LocalUserDbService {
        db: &state.db.client,
        ctx: &auth.ctx,
    };
    let user = users.get_ctx_user().await?;
    Ok(Json(UserView::from(user)))
}

async fn wallet_request(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<WalletRequestInput>,
) -> CtxResult<Json<WalletChallengeResponse>> {
    let nonce = AuthService::new(&state, &ctx).wallet_request(input).await?;
    let message = format!("{NONCE_MESSAGE_PREFIX}{nonce}");
    Ok(Json(WalletChallengeResponse { nonce, message }))
}

async fn wallet_verify(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<WalletVerifyInput>,
) -> CtxResult<Json<AuthResponse>> {
    let (token, user) = AuthService::new(&state, &ctx).wallet_verify(input).await?;
    Ok(Json(AuthResponse {
        token,
        user: UserView::from(user),
    }))
}

async fn forgot_password(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<ForgotPasswordInput>,
) -> CtxResult<Json<StatusResponse>> {
    AuthService::new(&state, &ctx).forgot_password(input).await?;
    Ok(Json(StatusResponse {
        message: "Verification code sent".to_string(),
    }))
}

async fn verify_otp(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<VerifyOtpInput>,
) -> CtxResult<Json<OtpVerifiedResponse>> {
    let otp_token = AuthService::new(&state, &ctx).verify_otp(input).await?;
    Ok(Json(OtpVerifiedResponse {
        message: "Code verified".to_string(),
        otp_token,
    }))
}

async fn reset_password(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<ResetPasswordInput>,
) -> CtxResult<Json<StatusResponse>> {
    AuthService::new(&state, &ctx).reset_password(input).await?;
    Ok(Json(StatusResponse {
        message: "Password updated".to_string(),
    }))
}

async fn resend_otp(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonValidated(input): JsonValidated<ForgotPasswordInput>,
) -> CtxResult<Json<StatusResponse>> {
    AuthService::new(&state, &ctx).resend_otp(input).await?;
    Ok(Json(StatusResponse {
        message: "Verification code sent".to_string(),
    }))
}
