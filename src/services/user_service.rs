use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    entities::user_auth::{
        follow_entity::FollowDbService,
        local_user_entity::{Badge, LocalUser, LocalUserDbService, SocialLink},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::CtxState,
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
    models::view::user::{ProfileView, UserView},
    utils::validate_utils::{trim_string, validate_social_platform, validate_wallet_address},
};

#[derive(Debug, Deserialize, Validate)]
pub struct WalletLinkInput {
    #[validate(custom(function = validate_wallet_address))]
    pub wallet_address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SocialLinkInput {
    #[validate(custom(function = validate_social_platform))]
    pub platform: String,
    #[validate(length(min = 1, message = "Username required"))]
    #[serde(deserialize_with = "trim_string")]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InterestsInput {
    #[validate(length(max = 30, message = "Too many interests"))]
    pub interests: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BadgeClaimInput {
    #[validate(length(min = 1, message = "badge_id required"))]
    pub badge_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReferralInfoView {
    pub referral_code: Option<String>,
    pub referral_count: u32,
    pub referral_level: u8,
}

pub struct UserService<'a> {
    ctx: &'a Ctx,
    users: LocalUserDbService<'a>,
    follows: FollowDbService<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(state: &'a CtxState, ctx: &'a Ctx) -> Self {
        Self {
            ctx,
            users: LocalUserDbService {
                db: &state.db.client,
                ctx,
            },
            follows: FollowDbService {
                db: &state.db.client,
                ctx,
            },
        }
    }

    /// Own profile when `user_id` is None, another member's otherwise.
    pub async fn get_profile(&self, user_id: Option<&str>) -> CtxResult<ProfileView> {
        let user_thing = match user_id {
            Some(id) => get_str_thing(id).map_err(|e| self.ctx.to_ctx_error(e))?,
            None => self.users.get_ctx_user_thing().await?,
        };
        let user: UserView = self.users.get_view(IdentIdName::Id(user_thing.clone())).await?;
        let followers_count = self
            .follows
            .user_followers_number(user_thing.clone())
            .await?;
        let following_count = self.follows.user_following_number(user_thing).await?;
        Ok(ProfileView {
            user,
            followers_count,
            following_count,
        })
    }

    pub async fn link_wallet(&self, input: WalletLinkInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let address = input.wallet_address.to_lowercase();

        let mut user = self.users.get_ctx_user().await?;
        if let Some(existing) = self.users.get_by_wallet(&address).await? {
            if existing.id != user.id {
                return Err(self.ctx.to_ctx_error(AppError::Conflict {
                    description: "Wallet is linked to another account".to_string(),
                }));
            }
        }
        user.wallet_address = Some(address);
        self.users.update(user).await
    }

    /// A second link for the same platform replaces the first.
    pub async fn add_social_link(&self, input: SocialLinkInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let platform = input.platform.to_lowercase();

        let mut user = self.users.get_ctx_user().await?;
        user.social_links.retain(|l| l.platform != platform);
        user.social_links.push(SocialLink {
            platform,
            username: input.username,
            verified: false,
        });
        self.users.update(user).await
    }

    pub async fn set_interests(&self, input: InterestsInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let mut user = self.users.get_ctx_user().await?;
        user.interests = input
            .interests
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        self.users.update(user).await
    }

    pub async fn follow(&self, user_id: &str) -> CtxResult<()> {
        let actor = self.users.get_ctx_user_thing().await?;
        let target = get_str_thing(user_id).map_err(|e| self.ctx.to_ctx_error(e))?;

        if actor == target {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                source: "can not follow yourself".to_string(),
            }));
        }
        // 404 before the relation write
        self.users.get(IdentIdName::Id(target.clone())).await?;

        if self.follows.is_following(actor.clone(), target.clone()).await? {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "already following".to_string(),
            }));
        }
        self.follows.create_follow(actor, target).await?;
        Ok(())
    }

    pub async fn unfollow(&self, user_id: &str) -> CtxResult<()> {
        let actor = self.users.get_ctx_user_thing().await?;
        let target = get_str_thing(user_id).map_err(|e| self.ctx.to_ctx_error(e))?;

        if !self.follows.is_following(actor.clone(), target.clone()).await? {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                source: "not following this user".to_string(),
            }));
        }
        self.follows.remove_follow(actor, target).await?;
        Ok(())
    }

    pub async fn following(&self) -> CtxResult<Vec<UserView>> {
        let actor = self.users.get_ctx_user_thing().await?;
        let users = self.follows.user_following(actor).await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn referral_info(&self) -> CtxResult<ReferralInfoView> {
        let user = self.users.get_ctx_user().await?;
        Ok(ReferralInfoView {
            referral_code: user.referral_code,
            referral_count: user.referral_count,
            referral_level: user.referral_level,
        })
    }

    pub async fn claim_badge(&self, input: BadgeClaimInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let user = self.users.get_ctx_user().await?;
        if user.badges.iter().any(|b| b.badge_id == input.badge_id) {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "badge already claimed".to_string(),
            }));
        }
        let user_thing = user.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "user has no id".to_string(),
            },
        ))?;
        self.users
            .add_badge(
                user_thing,
                Badge {
                    badge_id: input.badge_id,
                    earned_at: chrono::Utc::now(),
                },
            )
            .await?;
        self.users.get_ctx_user().await
    }
}
