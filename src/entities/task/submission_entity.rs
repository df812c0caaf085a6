use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::task::task_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxResult},
};

#[derive(Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub task: Thing,
    pub contributor: Thing,
    pub content: String,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
}

pub struct SubmissionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "submission";
const TABLE_COL_TASK: &str = task_entity::TABLE_NAME;
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> SubmissionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS task ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_TASK}>;
    DEFINE INDEX IF NOT EXISTS task_idx ON TABLE {TABLE_NAME} COLUMNS task;
    DEFINE FIELD IF NOT EXISTS contributor ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS contributor_idx ON TABLE {TABLE_NAME} COLUMNS contributor;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['pending', 'approved', 'rejected'];
    DEFINE FIELD IF NOT EXISTS reviewed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS review_note ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate submission");

        Ok(())
    }

    pub async fn get_by_id(&self, id: Thing) -> CtxResult<Option<Submission>> {
        let data: Option<Submission> = self.db.select((id.tb, id.id.to_raw())).await?;
        Ok(data)
    }

    pub async fn get_pending_by_task(&self, task: Thing) -> CtxResult<Option<Submission>> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE task = $task AND status = 'pending' LIMIT 1;"
        );
        let mut res = self.db.query(qry).bind(("task", task)).await?;
        let data: Option<Submission> = res.take(0)?;
        Ok(data)
    }

    pub async fn list_by_task(&self, task: Thing) -> CtxResult<Vec<Submission>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE task = $task ORDER BY r_created DESC;");
        let mut res = self.db.query(qry).bind(("task", task)).await?;
        Ok(res.take::<Vec<Submission>>(0)?)
    }
}
