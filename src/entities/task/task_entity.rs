use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_list_view, get_entity_view, get_list_qry, with_not_found_err,
    IdentIdName, Pagination, QryBindingsVal, ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub creator: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Thing>,
    pub reward: f64,
    // surreal datetime so full-record writes keep the field a real datetime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Datetime>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub applicants: i64,
    #[serde(default)]
    pub has_submission: bool,
    pub escrow_amount: f64,
    #[serde(default)]
    pub platform_fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    // db-managed, never written from Rust
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub r_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TaskCreate {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub creator: Thing,
    pub reward: f64,
    pub deadline: Option<Datetime>,
    pub tags: Vec<String>,
    pub escrow_amount: f64,
}

pub struct TaskDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "task";
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> TaskDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['pending', 'in_progress', 'completed'];
    DEFINE FIELD IF NOT EXISTS creator ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS creator_idx ON TABLE {TABLE_NAME} COLUMNS creator;
    DEFINE FIELD IF NOT EXISTS assignee ON TABLE {TABLE_NAME} TYPE option<record<{TABLE_COL_USER}>>;
    DEFINE INDEX IF NOT EXISTS assignee_idx ON TABLE {TABLE_NAME} COLUMNS assignee;
    DEFINE FIELD IF NOT EXISTS reward ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS deadline ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS tags ON TABLE {TABLE_NAME} TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS applicants ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS has_submission ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS escrow_amount ON TABLE {TABLE_NAME} TYPE number ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS platform_fee ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS transaction_hash ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate task");

        Ok(())
    }

    pub async fn create(&self, record: TaskCreate) -> CtxResult<Task> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "task create returned no record".to_string(),
            }))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Task> {
        let opt = get_entity::<Task>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_by_id<T: for<'de> Deserialize<'de> + ViewFieldSelector>(
        &self,
        id: &Thing,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(
            self.db,
            TABLE_NAME.to_string(),
            &IdentIdName::Id(id.clone()),
        )
        .await?;
        with_not_found_err(opt, self.ctx, &id.to_raw())
    }

    pub async fn list<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        status: Option<TaskStatus>,
        creator: Option<Thing>,
        assignee: Option<Thing>,
        pagination: Option<Pagination>,
    ) -> CtxResult<Vec<T>> {
        let mut filter_by: Vec<IdentIdName> = vec![];
        if let Some(status) = status {
            filter_by.push(IdentIdName::ColumnIdent {
                column: "status".to_string(),
                val: status.to_string(),
                rec: false,
            });
        }
        if let Some(creator) = creator {
            filter_by.push(IdentIdName::ColumnIdent {
                column: "creator".to_string(),
                val: creator.to_raw(),
                rec: true,
            });
        }
        if let Some(assignee) = assignee {
            filter_by.push(IdentIdName::ColumnIdent {
                column: "assignee".to_string(),
                val: assignee.to_raw(),
                rec: true,
            });
        }
        if filter_by.is_empty() {
            let fields = T::get_select_query_fields();
            let qry =
                format!("SELECT {fields} FROM {TABLE_NAME} ORDER BY created_at DESC;");
            let mut res = self.db.query(qry).await?;
            return Ok(res.take::<Vec<T>>(0)?);
        }
        if let Some(pagination) = pagination {
            return get_entity_list_view::<T>(
                self.db,
                TABLE_NAME.to_string(),
                &IdentIdName::ColumnIdentAnd(filter_by),
                Some(pagination),
            )
            .await;
        }
        // unpaginated filtered lists stay newest-first, no implicit limit
        let ident = IdentIdName::ColumnIdentAnd(filter_by);
        let fields = T::get_select_query_fields();
        let qry = format!("SELECT {fields} FROM {TABLE_NAME} WHERE {ident} ORDER BY created_at DESC;");
        get_list_qry(self.db, QryBindingsVal::new(qry, ident.get_bindings_map())).await
    }

    pub async fn update_fields(&self, task_id: Thing, record: Task) -> CtxResult<Task> {
        let task: Option<Task> = self
            .db
            .upsert((task_id.tb, task_id.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        task.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "task update returned no record".to_string(),
        }))
    }

    pub async fn delete(&self, task_id: Thing) -> CtxResult<()> {
        let _: Option<Task> = self
            .db
            .delete((task_id.tb, task_id.id.to_raw()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
