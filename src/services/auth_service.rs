use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::user_auth::{
        local_user_entity::{LocalUser, LocalUserDbService, UserRole},
        verification_code_entity::{UseCodeFor, VerificationCode, VerificationCodeDbService},
        wallet_nonce_entity::WalletNonceDbService,
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::CtxState,
        utils::{db_utils::IdentIdName, string_utils::get_string_thing},
    },
    models::email,
    utils::{
        eth::{addresses_match, recover_personal},
        generate,
        hash::{hash_password, verify_password},
        validate_utils::validate_wallet_address,
    },
};

pub const NONCE_MESSAGE_PREFIX: &str = "BaseConnect authentication nonce: ";

#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteProfileInput {
    pub role: Option<UserRole>,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WalletRequestInput {
    #[validate(custom(function = validate_wallet_address))]
    pub wallet_address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WalletVerifyInput {
    #[validate(custom(function = validate_wallet_address))]
    pub wallet_address: String,
    #[validate(length(min = 1, message = "Signature required"))]
    pub signature: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordInput {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "Code is 6 digits"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "Code is 6 digits"))]
    pub code: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
}

pub struct AuthService<'a> {
    ctx: &'a Ctx,
    state: &'a CtxState,
    users: LocalUserDbService<'a>,
    nonces: WalletNonceDbService<'a>,
    codes: VerificationCodeDbService<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a CtxState, ctx: &'a Ctx) -> Self {
        Self {
            ctx,
            state,
            users: LocalUserDbService {
                db: &state.db.client,
                ctx,
            },
            nonces: WalletNonceDbService {
                db: &state.db.client,
                ctx,
            },
            codes: VerificationCodeDbService {
                db: &state.db.client,
                ctx,
            },
        }
    }

    pub async fn signup(&self, input: SignupInput) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let email = input.email.to_lowercase();
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "The email is already used".to_string(),
            }));
        }

        let referrer = match &input.referral_code {
            Some(code) => self.users.get_by_referral_code(code).await?,
            None => None,
        };

        let hash = hash_password(&input.password)
            .map_err(|e| self.ctx.to_ctx_error(AppError::Generic { description: e }))?;

        let user = LocalUser {
            email: Some(email),
            password_hash: Some(hash),
            referral_code: Some(generate::generate_referral_code()),
            ..Default::default()
        };
        let user_id = self.users.create(user).await?;

        if let Some(referrer) = referrer {
            if let Some(referrer_id) = referrer.id {
                self.users.credit_referral(referrer_id).await?;
            }
        }

        let user = self
            .users
            .get(IdentIdName::Id(get_string_thing(user_id)?))
            .await?;
        let token = self.build_token(&user)?;
        Ok((token, user))
    }

    pub async fn login(&self, input: LoginInput) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let invalid = || {
            self.ctx.to_ctx_error(AppError::AuthenticationFail {
                description: "Invalid email or password".to_string(),
            })
        };

        let user = self
            .users
            .get_by_email(&input.email.to_lowercase())
            .await?
            .ok_or_else(invalid)?;

        let hash = user.password_hash.clone().ok_or_else(invalid)?;
        if !verify_password(&hash, &input.password) {
            return Err(invalid());
        }

        let token = self.build_token(&user)?;
        Ok((token, user))
    }

    // sets role once, flips profile_completed and reissues the token
    pub async fn complete_profile(
        &self,
        input: CompleteProfileInput,
    ) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let mut user = self.users.get_ctx_user().await?;

        if let Some(role) = input.role {
            match user.role {
                Some(existing) if existing != role => {
                    return Err(self.ctx.to_ctx_error(AppError::Conflict {
                        description: "Role is already set".to_string(),
                    }));
                }
                _ => user.role = Some(role),
            }
        }
        if let Some(full_name) = input.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(bio) = input.bio {
            user.bio = Some(bio);
        }
        if let Some(interests) = input.interests {
            user.interests = interests;
        }
        user.profile_completed = true;

        let user = self.users.update(user).await?;
        let token = self.build_token(&user)?;
        Ok((token, user))
    }

    pub async fn wallet_request(&self, input: WalletRequestInput) -> CtxResult<String> {
        input.validate()?;

        let nonce = generate::generate_nonce();
        self.nonces.create(&input.wallet_address, &nonce).await?;
        Ok(nonce)
    }

    pub async fn wallet_verify(&self, input: WalletVerifyInput) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let address = input.wallet_address.to_lowercase();
        let challenge_err = || {
            self.ctx.to_ctx_error(AppError::AuthenticationFail {
                description: "invalid or expired challenge".to_string(),
            })
        };

        let nonce_rec = self
            .nonces
            .get_by_address(&address)
            .await?
            .ok_or_else(challenge_err)?;

        let created = nonce_rec.r_created.ok_or_else(challenge_err)?;
        if Utc::now().signed_duration_since(created) > self.state.wallet_nonce_ttl {
            if let Some(id) = nonce_rec.id {
                self.nonces.delete(id).await?;
            }
            return Err(challenge_err());
        }

        let message = format!("{NONCE_MESSAGE_PREFIX}{}", nonce_rec.nonce);
        let recovered = recover_personal(&message, &input.signature)
            .map_err(|e| self.ctx.to_ctx_error(e))?;

        if !addresses_match(&recovered, &address) {
            return Err(self.ctx.to_ctx_error(AppError::AuthenticationFail {
                description: "signature verification failed".to_string(),
            }));
        }

        // single use: consume before issuing the session
        if let Some(id) = nonce_rec.id {
            self.nonces.delete(id).await?;
        }

        let user = match self.users.get_by_wallet(&address).await? {
            Some(user) => user,
            None => {
                let user = LocalUser {
                    wallet_address: Some(address.clone()),
                    referral_code: Some(generate::generate_referral_code()),
                    ..Default::default()
                };
                let user_id = self.users.create(user).await?;
                self.users
                    .get(IdentIdName::Id(get_string_thing(user_id)?))
                    .await?
            }
        };

        let token = self.build_token(&user)?;
        Ok((token, user))
    }

    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> CtxResult<()> {
        input.validate()?;
        self.create_and_send_code(&input.email).await
    }

    pub async fn resend_otp(&self, input: ForgotPasswordInput) -> CtxResult<()> {
        input.validate()?;
        self.create_and_send_code(&input.email).await
    }

    // a valid code yields a short-lived token scoped to password reset
    pub async fn verify_otp(&self, input: VerifyOtpInput) -> CtxResult<String> {
        input.validate()?;

        let user = self.require_user_by_email(&input.email).await?;
        let user_id = user.id.clone().ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user has no id".to_string(),
        }))?;
        self.get_verified_code(user_id.clone(), &input.code).await?;
        self.state
            .jwt
            .create_by_otp(&user_id.to_raw())
            .map_err(|e| {
                self.ctx
                    .to_ctx_error(AppError::AuthFailJwtInvalid { source: e })
            })
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> CtxResult<()> {
        input.validate()?;

        let mut user = self.require_user_by_email(&input.email).await?;
        let user_id = user.id.clone().ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user has no id".to_string(),
        }))?;

        let code = self.get_verified_code(user_id, &input.code).await?;

        let hash = hash_password(&input.password)
            .map_err(|e| self.ctx.to_ctx_error(AppError::Generic { description: e }))?;
        user.password_hash = Some(hash);
        self.users.update(user).await?;

        self.codes.delete_code(code.id).await?;
        Ok(())
    }

    async fn create_and_send_code(&self, email: &str) -> CtxResult<()> {
        let user = self.require_user_by_email(email).await?;
        let user_id = user.id.clone().ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user has no id".to_string(),
        }))?;

        let code = generate::generate_number_code(6);
        self.codes
            .create_code(
                user_id,
                code.clone(),
                email.to_lowercase(),
                UseCodeFor::ResetPassword,
            )
            .await?;

        // development mode logs the code instead of hitting the mail provider
        if self.state.is_development {
            tracing::debug!("password reset code for {}: {}", email.to_lowercase(), code);
            return Ok(());
        }

        let ttl = self.state.verification_code_ttl.num_minutes();
        self.state
            .email_sender
            .send(
                vec![email.to_lowercase()],
                &email::password_reset_body(&code, ttl),
                email::PASSWORD_RESET_SUBJECT,
            )
            .await
            .map_err(|e| self.ctx.to_ctx_error(AppError::Generic { description: e }))?;
        Ok(())
    }

    async fn require_user_by_email(&self, email: &str) -> CtxResult<LocalUser> {
        self.users
            .get_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| {
                self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                    ident: email.to_lowercase(),
                })
            })
    }

    async fn get_verified_code(
        &self,
        user_id: surrealdb::sql::Thing,
        code: &str,
    ) -> CtxResult<VerificationCode> {
        let data = self
            .codes
            .get_code(user_id, UseCodeFor::ResetPassword)
            .await?
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "Start new verification".to_string(),
            }))?;

        if data.failed_code_attempts >= 3 {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Too many attempts. Wait and start new verification.".to_string(),
            }));
        }

        let is_expired = Utc::now().signed_duration_since(data.r_created)
            > self.state.verification_code_ttl;
        if is_expired {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Start new verification".to_string(),
            }));
        }

        if data.code != code {
            self.codes.increase_code_attempt(data.id.clone()).await?;
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Wrong code.".to_string(),
            }));
        }
        Ok(data)
    }

    fn build_token(&self, user: &LocalUser) -> CtxResult<String> {
        let user_id = user
            .id
            .as_ref()
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "user has no id".to_string(),
            }))?
            .to_raw();
        self.state
            .jwt
            .create_by_login(&user_id, user.role, user.profile_completed)
            .map_err(|e| {
                self.ctx
                    .to_ctx_error(AppError::AuthFailJwtInvalid { source: e })
            })
    }
}
