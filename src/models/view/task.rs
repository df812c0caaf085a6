use crate::{
    entities::task::task_entity::TaskStatus,
    middleware::utils::db_utils::ViewFieldSelector,
    models::view::user::UserSummaryView,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub id: Thing,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub creator: UserSummaryView,
    pub assignee: Option<Thing>,
    pub reward: f64,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub applicants: i64,
    #[serde(default)]
    pub has_submission: bool,
    pub escrow_amount: f64,
    #[serde(default)]
    pub platform_fee: f64,
    pub transaction_hash: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ViewFieldSelector for TaskView {
    fn get_select_query_fields() -> String {
        "id, title, description, status, creator.{id, full_name, wallet_address}, assignee, reward, deadline, tags, applicants, has_submission, escrow_amount, platform_fee, transaction_hash, created_at".to_string()
    }
}
