use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

/// Named completion criteria evaluated against a user's profile state.
#[derive(Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum QuestType {
    CreateProfile,
    ConnectWallet,
    ConnectSocial,
    IdentityGraphComplete,
    Referrals,
    FollowCount,
    InterestGraphComplete,
    BadgeClaim,
    PartnerQuest,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaitlistTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub task_type: QuestType,
    pub required_value: u32,
}

pub struct WaitlistTaskDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "waitlist_task";

impl<'a> WaitlistTaskDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS task_id ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS category ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS task_type ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS required_value ON TABLE {TABLE_NAME} TYPE number DEFAULT 1;
    DEFINE INDEX IF NOT EXISTS waitlist_task_id_idx ON TABLE {TABLE_NAME} COLUMNS task_id UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate waitlist_task");

        Ok(())
    }

    pub async fn list(&self) -> CtxResult<Vec<WaitlistTask>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} ORDER BY task_id ASC;");
        let mut res = self.db.query(qry).await?;
        Ok(res.take::<Vec<WaitlistTask>>(0)?)
    }

    pub async fn get_by_task_id(&self, task_id: &str) -> CtxResult<Option<WaitlistTask>> {
        let qry = format!("SELECT * FROM {TABLE_NAME} WHERE task_id = $task_id;");
        let mut res = self
            .db
            .query(qry)
            .bind(("task_id", task_id.to_string()))
            .await?;
        let data: Option<WaitlistTask> = res.take(0)?;
        Ok(data)
    }

    // idempotent catalog seed, run at startup after migrations
    pub async fn seed(&self, entries: Vec<WaitlistTask>) -> CtxResult<()> {
        for mut entry in entries {
            let record_key = entry.task_id.clone();
            entry.id = None;
            let _: Option<WaitlistTask> = self
                .db
                .upsert((TABLE_NAME, record_key))
                .content(entry)
                .await
                .map_err(CtxError::from(self.ctx))?;
        }
        Ok(())
    }
}

pub fn default_catalog() -> Vec<WaitlistTask> {
    let entry = |task_id: &str, title: &str, description: &str, category: &str, task_type, required_value| {
        WaitlistTask {
            id: None,
            task_id: task_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            task_type,
            required_value,
        }
    };
    vec![
        entry(
            "createProfile",
            "Complete your profile",
            "Pick a role and finish profile setup",
            "profile",
            QuestType::CreateProfile,
            1,
        ),
        entry(
            "connectWallet",
            "Connect a wallet",
            "Link an Ethereum wallet to your account",
            "identity",
            QuestType::ConnectWallet,
            1,
        ),
        entry(
            "connectSocial",
            "Connect a social account",
            "Add at least one social link",
            "identity",
            QuestType::ConnectSocial,
            1,
        ),
        entry(
            "identityGraphComplete",
            "Complete your identity graph",
            "Link socials and a wallet",
            "identity",
            QuestType::IdentityGraphComplete,
            3,
        ),
        entry(
            "referrals",
            "Invite your friends",
            "Reach referral level 2 or higher",
            "growth",
            QuestType::Referrals,
            2,
        ),
        entry(
            "followCount",
            "Grow your network",
            "Follow at least 5 members",
            "social",
            QuestType::FollowCount,
            5,
        ),
        entry(
            "interestGraphComplete",
            "Share your interests",
            "Add at least 3 interests",
            "profile",
            QuestType::InterestGraphComplete,
            3,
        ),
        entry(
            "badgeClaim",
            "Claim a badge",
            "Earn your first badge",
            "growth",
            QuestType::BadgeClaim,
            1,
        ),
        entry(
            "partnerQuest",
            "Partner quest",
            "Coming soon",
            "partner",
            QuestType::PartnerQuest,
            1,
        ),
    ]
}
