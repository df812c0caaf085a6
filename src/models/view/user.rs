use crate::{
    entities::user_auth::local_user_entity::{Badge, LocalUser, SocialLink, UserRole},
    middleware::utils::db_utils::ViewFieldSelector,
};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: Thing,
    pub email: Option<String>,
    pub wallet_address: Option<String>,
    pub role: Option<UserRole>,
    pub profile_completed: bool,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub referral_code: Option<String>,
    #[serde(default)]
    pub referral_count: u32,
    #[serde(default)]
    pub referral_level: u8,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl From<LocalUser> for UserView {
    fn from(user: LocalUser) -> Self {
        UserView {
            id: user.id.unwrap_or_else(|| Thing::from(("local_user", ""))),
            email: user.email,
            wallet_address: user.wallet_address,
            role: user.role,
            profile_completed: user.profile_completed,
            full_name: user.full_name,
            bio: user.bio,
            social_links: user.social_links,
            interests: user.interests,
            referral_code: user.referral_code,
            referral_count: user.referral_count,
            referral_level: user.referral_level,
            badges: user.badges,
        }
    }
}

impl ViewFieldSelector for UserView {
    fn get_select_query_fields() -> String {
        "id, email, wallet_address, role, profile_completed, full_name, bio, social_links, interests, referral_code, referral_count, referral_level, badges".to_string()
    }
}

/// Small creator/applicant summary embedded in task listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummaryView {
    pub id: Thing,
    pub full_name: Option<String>,
    pub wallet_address: Option<String>,
}

/// Profile endpoint payload with the social graph counts resolved.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub followers_count: i64,
    pub following_count: i64,
}
