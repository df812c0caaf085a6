use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::middleware;
use middleware::error::AppError::EntityFailIdNotFound;
use middleware::utils::db_utils::{
    exists_entity, get_entity, get_entity_view, with_not_found_err, IdentIdName, RecordWithId,
    ViewFieldSelector,
};
use middleware::utils::string_utils::get_string_thing;
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

use crate::database::client::Db;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Creator,
    Contributor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub username: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Badge {
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct LocalUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub referral_count: u32,
    #[serde(default)]
    pub referral_level: u8,
    #[serde(default)]
    pub badges: Vec<Badge>,
    // db-managed, never written from Rust so the chrono string stays off the wire
    #[serde(default, skip_serializing)]
    pub r_created: Option<DateTime<Utc>>,
}

/// referral tiers by successful invite count
pub fn referral_level_for(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=4 => 1,
        5..=14 => 2,
        _ => 3,
    }
}

pub struct LocalUserDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "local_user";

impl<'a> LocalUserDbService<'a> {
    pub fn get_table_name() -> &'static str {
        TABLE_NAME
    }

    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS email ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS password_hash ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS wallet_address ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS role ON TABLE {TABLE_NAME} TYPE option<string> ASSERT $value INSIDE ['creator', 'contributor', NONE];
    DEFINE FIELD IF NOT EXISTS profile_completed ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS full_name ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS bio ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS social_links ON TABLE {TABLE_NAME} FLEXIBLE TYPE array DEFAULT [];
    DEFINE FIELD IF NOT EXISTS interests ON TABLE {TABLE_NAME} TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS referral_code ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS referral_count ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS referral_level ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS badges ON TABLE {TABLE_NAME} FLEXIBLE TYPE array DEFAULT [];
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS local_user_email_idx ON TABLE {TABLE_NAME} COLUMNS email UNIQUE;
    DEFINE INDEX IF NOT EXISTS local_user_wallet_idx ON TABLE {TABLE_NAME} COLUMNS wallet_address UNIQUE;
    DEFINE INDEX IF NOT EXISTS local_user_referral_code_idx ON TABLE {TABLE_NAME} COLUMNS referral_code UNIQUE;
");
        let local_user_mutation = self.db.query(sql).await?;

        local_user_mutation
            .check()
            .expect("should mutate local_user");

        Ok(())
    }

    pub async fn get_ctx_user_thing(&self) -> CtxResult<Thing> {
        let created_by = self.ctx.user_id()?;
        let user_id = get_string_thing(created_by.clone())?;
        let existing_id = self.exists(IdentIdName::Id(user_id.clone())).await?;
        match existing_id {
            None => Err(self
                .ctx
                .to_ctx_error(EntityFailIdNotFound { ident: created_by })),
            Some(_uid) => Ok(user_id),
        }
    }

    pub async fn get_ctx_user(&self) -> CtxResult<LocalUser> {
        let created_by = self.ctx.user_id()?;
        let user_id = get_string_thing(created_by.clone())?;
        self.get(IdentIdName::Id(user_id)).await
    }

    pub async fn exists(&self, ident: IdentIdName) -> CtxResult<Option<String>> {
        exists_entity(self.db, TABLE_NAME.to_string(), &ident)
            .await
            .map(|r| r.map(|o| o.to_raw()))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<LocalUser> {
        let opt = get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_by_email(&self, email: &str) -> CtxResult<Option<LocalUser>> {
        let ident = IdentIdName::ColumnIdent {
            column: "email".to_string(),
            val: email.to_lowercase(),
            rec: false,
        };
        get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await
    }

    pub async fn get_by_wallet(&self, wallet_address: &str) -> CtxResult<Option<LocalUser>> {
        let ident = IdentIdName::ColumnIdent {
            column: "wallet_address".to_string(),
            val: wallet_address.to_lowercase(),
            rec: false,
        };
        get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await
    }

    pub async fn get_by_referral_code(&self, code: &str) -> CtxResult<Option<LocalUser>> {
        let ident = IdentIdName::ColumnIdent {
            column: "referral_code".to_string(),
            val: code.to_string(),
            rec: false,
        };
        get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn create(&self, ct_input: LocalUser) -> CtxResult<String> {
        let local_user_id: String = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map_err(CtxError::from(self.ctx))?
            .map(|v: RecordWithId| v.id.id.to_raw())
            .map(|id| format!("{TABLE_NAME}:{id}"))
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "user create returned no record".to_string(),
            }))?;
        Ok(local_user_id)
    }

    pub async fn update(&self, record: LocalUser) -> CtxResult<LocalUser> {
        let resource = record.id.clone().ok_or(AppError::Generic {
            description: "can not update user with no id".to_string(),
        })?;

        let user: Option<LocalUser> = self
            .db
            .upsert((resource.tb, resource.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        user.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user update returned no record".to_string(),
        }))
    }

    pub async fn credit_referral(&self, referrer_id: Thing) -> CtxResult<()> {
        let qry = "
            UPDATE $referrer_id SET
                referral_count += 1,
                referral_level =
                    IF referral_count >= 15 THEN 3
                    ELSE IF referral_count >= 5 THEN 2
                    ELSE IF referral_count >= 1 THEN 1
                    ELSE 0 END;
        ";
        let res = self.db.query(qry).bind(("referrer_id", referrer_id)).await?;
        res.check().map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn add_badge(&self, user_id: Thing, badge: Badge) -> CtxResult<()> {
        let res = self
            .db
            .query("UPDATE $user_id SET badges += $badge;")
            .bind(("user_id", user_id))
            .bind(("badge", badge))
            .await?;
        res.check().map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_levels() {
        assert_eq!(referral_level_for(0), 0);
        assert_eq!(referral_level_for(1), 1);
        assert_eq!(referral_level_for(4), 1);
        assert_eq!(referral_level_for(5), 2);
        assert_eq!(referral_level_for(14), 2);
        assert_eq!(referral_level_for(15), 3);
        assert_eq!(referral_level_for(100), 3);
    }
}
