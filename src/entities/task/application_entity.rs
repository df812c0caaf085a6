use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::task::task_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::ViewFieldSelector;
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxResult},
};

#[derive(Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub task: Thing,
    pub applicant: Thing,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicantView {
    pub id: Thing,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub applicant: ApplicantUserView,
    pub r_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicantUserView {
    pub id: Thing,
    pub full_name: Option<String>,
    pub wallet_address: Option<String>,
}

impl ViewFieldSelector for ApplicantView {
    fn get_select_query_fields() -> String {
        "id, status, cover_letter, r_created, applicant.{id, full_name, wallet_address}"
            .to_string()
    }
}

pub struct ApplicationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "application";
const TABLE_COL_TASK: &str = task_entity::TABLE_NAME;
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> ApplicationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS task ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_TASK}>;
    DEFINE INDEX IF NOT EXISTS task_idx ON TABLE {TABLE_NAME} COLUMNS task;
    DEFINE FIELD IF NOT EXISTS applicant ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS applicant_idx ON TABLE {TABLE_NAME} COLUMNS applicant;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['pending', 'accepted', 'rejected'];
    DEFINE FIELD IF NOT EXISTS cover_letter ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS task_applicant_unique_idx ON TABLE {TABLE_NAME} COLUMNS task, applicant UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate application");

        Ok(())
    }

    pub async fn get_by_task_and_applicant(
        &self,
        task: Thing,
        applicant: Thing,
    ) -> CtxResult<Option<Application>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE task = $task AND applicant = $applicant;");
        let mut res = self
            .db
            .query(qry)
            .bind(("task", task))
            .bind(("applicant", applicant))
            .await?;
        let data: Option<Application> = res.take(0)?;
        Ok(data)
    }

    pub async fn get_by_id(&self, id: Thing) -> CtxResult<Option<Application>> {
        let data: Option<Application> = self.db.select((id.tb, id.id.to_raw())).await?;
        Ok(data)
    }

    pub async fn list_by_task(&self, task: Thing) -> CtxResult<Vec<ApplicantView>> {
        let fields = ApplicantView::get_select_query_fields();
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} WHERE task = $task ORDER BY r_created ASC;"
        );
        let mut res = self.db.query(qry).bind(("task", task)).await?;
        Ok(res.take::<Vec<ApplicantView>>(0)?)
    }
}
