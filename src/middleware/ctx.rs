use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use reqwest::StatusCode;
use uuid::Uuid;

use crate::middleware::mw_ctx::CtxState;
use crate::utils::jwt::TokenType;

use super::error::{AppError, AppResult, CtxError, CtxResult};

#[derive(Clone, Debug)]
pub struct Ctx {
    result_user_id: AppResult<String>,
    req_id: Uuid,
}

impl Ctx {
    pub fn new(result_user_id: AppResult<String>, req_id: Uuid) -> Self {
        Self {
            result_user_id,
            req_id,
        }
    }

    pub fn req_id(&self) -> Uuid {
        self.req_id
    }

    pub fn user_id(&self) -> CtxResult<String> {
        self.result_user_id.clone().map_err(|error| CtxError {
            error,
            req_id: self.req_id,
        })
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError {
            error,
            req_id: self.req_id,
        }
    }
}

// Never rejects - public handlers get a Ctx whose user_id() errors until login.
#[axum::async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state): State<Arc<CtxState>> = State::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let jwt_user_id: AppResult<String> =
            match parts.headers.typed_get::<Authorization<Bearer>>() {
                Some(token) => match app_state.jwt.decode_by_type(token.token(), TokenType::Login)
                {
                    Ok(claims) => Ok(claims.auth),
                    Err(source) => Err(AppError::AuthFailJwtInvalid { source }),
                },
                None => Err(AppError::AuthFailNoBearerToken),
            };

        Ok(Ctx::new(jwt_user_id, Uuid::new_v4()))
    }
}
