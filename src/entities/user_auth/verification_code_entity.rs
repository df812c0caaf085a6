use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum UseCodeFor {
    ResetPassword,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationCode {
    pub id: Thing,
    pub code: String,
    pub failed_code_attempts: u8,
    pub user: Thing,
    pub email: String,
    pub use_for: UseCodeFor,
    pub r_created: DateTime<Utc>,
}

pub struct VerificationCodeDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "verification_code";
const TABLE_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> VerificationCodeDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_USER}>;
    DEFINE FIELD IF NOT EXISTS email ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS use_for ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS code ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS failed_code_attempts ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS user_idx ON TABLE {TABLE_NAME} COLUMNS user;
    DEFINE INDEX IF NOT EXISTS use_for_idx ON TABLE {TABLE_NAME} COLUMNS use_for;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate verification_code");

        Ok(())
    }

    pub async fn get_code(
        &self,
        user_id: Thing,
        use_for: UseCodeFor,
    ) -> CtxResult<Option<VerificationCode>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE user = $user_id AND use_for = $use_for;");
        let mut res = self
            .db
            .query(qry)
            .bind(("user_id", user_id))
            .bind(("use_for", use_for))
            .await?;
        let data: Option<VerificationCode> = res.take(0)?;
        Ok(data)
    }

    pub async fn create_code(
        &self,
        user_id: Thing,
        code: String,
        email: String,
        use_for: UseCodeFor,
    ) -> CtxResult<()> {
        let qry = format!("
            BEGIN TRANSACTION;
                DELETE FROM {TABLE_NAME} WHERE user = $user_id AND use_for = $use_for;
                CREATE {TABLE_NAME} SET user=$user_id, code=$code, email=$email, use_for=$use_for;
            COMMIT TRANSACTION;
        ");
        let res = self
            .db
            .query(qry)
            .bind(("user_id", user_id))
            .bind(("code", code))
            .bind(("email", email))
            .bind(("use_for", use_for))
            .await?;
        res.check().map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn increase_code_attempt(&self, code_id: Thing) -> CtxResult<()> {
        let res = self
            .db
            .query("UPDATE $code_id SET failed_code_attempts += 1;")
            .bind(("code_id", code_id))
            .await?;
        res.check().map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn delete_code(&self, id: Thing) -> CtxResult<()> {
        let _: Option<VerificationCode> = self.db.delete((id.tb, id.id.to_raw())).await?;
        Ok(())
    }
}
