use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::entities::waitlist::waitlist_task_entity;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestProgress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    pub waitlist_task: Thing,
    pub status: QuestStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_data: Option<serde_json::Value>,
}

pub struct QuestProgressDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "quest_progress";
const TABLE_USER: &str = local_user_entity::TABLE_NAME;
const TABLE_WAITLIST: &str = waitlist_task_entity::TABLE_NAME;

impl<'a> QuestProgressDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_USER}>;
    DEFINE FIELD IF NOT EXISTS waitlist_task ON TABLE {TABLE_NAME} TYPE record<{TABLE_WAITLIST}>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['not_started', 'in_progress', 'completed'];
    DEFINE FIELD IF NOT EXISTS progress ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0 AND $value <= 100;
    DEFINE FIELD IF NOT EXISTS completed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS verification_data ON TABLE {TABLE_NAME} FLEXIBLE TYPE option<object>;
    DEFINE INDEX IF NOT EXISTS user_waitlist_unique_idx ON TABLE {TABLE_NAME} COLUMNS user, waitlist_task UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate quest_progress");

        Ok(())
    }

    // derived cache: verify recomputes and replaces the record in place
    pub async fn upsert(&self, record: QuestProgress) -> CtxResult<QuestProgress> {
        let qry = format!("
            BEGIN TRANSACTION;
                DELETE FROM {TABLE_NAME} WHERE user = $user AND waitlist_task = $waitlist_task;
                CREATE {TABLE_NAME} SET user=$user, waitlist_task=$waitlist_task, status=$status,
                    progress=$progress, completed_at=$completed_at, verification_data=$verification_data;
            COMMIT TRANSACTION;
        ");
        let mut res = self
            .db
            .query(qry)
            .bind(("user", record.user))
            .bind(("waitlist_task", record.waitlist_task))
            .bind(("status", record.status))
            .bind(("progress", record.progress as i64))
            .bind(("completed_at", record.completed_at.map(Datetime::from)))
            .bind(("verification_data", record.verification_data))
            .await?;
        let created: Option<QuestProgress> = res.take(1).map_err(CtxError::from(self.ctx))?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "quest progress upsert returned no record".to_string(),
        }))
    }

    pub async fn list_by_user(&self, user: Thing) -> CtxResult<Vec<QuestProgress>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE user = $user;");
        let mut res = self.db.query(qry).bind(("user", user)).await?;
        Ok(res.take::<Vec<QuestProgress>>(0)?)
    }
}
