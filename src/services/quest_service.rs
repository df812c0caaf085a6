use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::{
    entities::{
        user_auth::{
            follow_entity::FollowDbService,
            local_user_entity::{LocalUser, LocalUserDbService},
        },
        waitlist::{
            quest_progress_entity::{QuestProgress, QuestProgressDbService, QuestStatus},
            waitlist_task_entity::{QuestType, WaitlistTask, WaitlistTaskDbService},
        },
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::CtxState,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct QuestOutcome {
    pub completed: bool,
    pub progress: u8,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QuestProgressView {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub task_type: QuestType,
    pub required_value: u32,
    pub status: QuestStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct WaitlistProgressResponse {
    pub quests: Vec<QuestProgressView>,
    pub completed_count: usize,
    pub total_count: usize,
    pub overall_progress: u8,
}

fn ratio_progress(count: u32, required: u32) -> u8 {
    if required == 0 {
        return 100;
    }
    let pct = (count as f64 / required as f64 * 100.0).round();
    pct.min(100.0) as u8
}

/// Evaluates a quest against the user's current state. Pure so the predicate
/// table stays testable without a database.
pub fn evaluate(
    quest_type: QuestType,
    user: &LocalUser,
    following_count: i64,
    required: u32,
) -> QuestOutcome {
    match quest_type {
        QuestType::CreateProfile => {
            let completed = user.profile_completed;
            QuestOutcome {
                completed,
                progress: if completed { 100 } else { 0 },
                metadata: json!({ "profile_completed": user.profile_completed }),
            }
        }
        QuestType::ConnectWallet => {
            // a stored wallet_address only exists after a signed challenge
            // or an explicit link, so its presence is the completion signal
            let completed = user.wallet_address.is_some();
            QuestOutcome {
                completed,
                progress: if completed { 100 } else { 0 },
                metadata: json!({ "wallet_connected": completed }),
            }
        }
        QuestType::ConnectSocial => {
            let count = user.social_links.len() as u32;
            QuestOutcome {
                completed: count >= required,
                progress: ratio_progress(count, required),
                metadata: json!({ "social_count": count, "required": required }),
            }
        }
        QuestType::IdentityGraphComplete => {
            // socials plus the wallet each count as one identity edge
            let count =
                user.social_links.len() as u32 + if user.wallet_address.is_some() { 1 } else { 0 };
            QuestOutcome {
                completed: count >= required,
                progress: ratio_progress(count, required),
                metadata: json!({ "identity_count": count, "required": required }),
            }
        }
        QuestType::Referrals => {
            if required >= 2 {
                // tier quest: completion is reaching level 2 of 3
                let level = user.referral_level.min(3);
                QuestOutcome {
                    completed: (2..=3).contains(&level),
                    progress: ratio_progress(level as u32, 3),
                    metadata: json!({
                        "referral_level": level,
                        "referral_count": user.referral_count,
                    }),
                }
            } else {
                let count = user.referral_count;
                QuestOutcome {
                    completed: count >= required,
                    progress: ratio_progress(count, required),
                    metadata: json!({ "referral_count": count, "required": required }),
                }
            }
        }
        QuestType::FollowCount => {
            let count = following_count.max(0) as u32;
            QuestOutcome {
                completed: count >= required,
                progress: ratio_progress(count, required),
                metadata: json!({ "following_count": count, "required": required }),
            }
        }
        QuestType::InterestGraphComplete => {
            let count = user.interests.len() as u32;
            QuestOutcome {
                completed: count >= required,
                progress: ratio_progress(count, required),
                metadata: json!({ "interest_count": count, "required": required }),
            }
        }
        QuestType::BadgeClaim => {
            let count = user.badges.len() as u32;
            let completed = count > 0;
            QuestOutcome {
                completed,
                progress: if completed { 100 } else { 0 },
                metadata: json!({ "badge_count": count }),
            }
        }
        QuestType::PartnerQuest => QuestOutcome {
            completed: false,
            progress: 0,
            metadata: json!({ "available": false }),
        },
    }
}

fn status_for(outcome: &QuestOutcome) -> QuestStatus {
    if outcome.completed {
        QuestStatus::Completed
    } else if outcome.progress > 0 {
        QuestStatus::InProgress
    } else {
        QuestStatus::NotStarted
    }
}

pub struct QuestService<'a> {
    ctx: &'a Ctx,
    users: LocalUserDbService<'a>,
    follows: FollowDbService<'a>,
    catalog: WaitlistTaskDbService<'a>,
    progress: QuestProgressDbService<'a>,
}

impl<'a> QuestService<'a> {
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
            catalog: WaitlistTaskDbService {
                db: &state.db.client,
                ctx,
            },
            progress: QuestProgressDbService {
                db: &state.db.client,
                ctx,
            },
        }
    }

    pub async fn catalog(&self) -> CtxResult<Vec<WaitlistTask>> {
        self.catalog.list().await
    }

    /// Re-evaluates one quest and stores the result.
    pub async fn verify(&self, task_id: &str) -> CtxResult<QuestProgressView> {
        let entry = self
            .catalog
            .get_by_task_id(task_id)
            .await?
            .ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: task_id.to_string(),
            }))?;
        let entry_thing = entry.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "waitlist task has no id".to_string(),
            },
        ))?;

        let user = self.users.get_ctx_user().await?;
        let user_thing = user.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "user has no id".to_string(),
            },
        ))?;
        let following = self
            .follows
            .user_following_number(user_thing.clone())
            .await?;

        let outcome = evaluate(entry.task_type, &user, following, entry.required_value);
        let status = status_for(&outcome);
        let stored = self
            .progress
            .upsert(QuestProgress {
                id: None,
                user: user_thing,
                waitlist_task: entry_thing,
                status,
                progress: outcome.progress,
                completed_at: if outcome.completed {
                    Some(Utc::now())
                } else {
                    None
                },
                verification_data: Some(outcome.metadata),
            })
            .await?;

        Ok(Self::view(entry, Some(&stored)))
    }

    /// Catalog joined with the user's cached progress records.
    pub async fn get_progress(&self) -> CtxResult<WaitlistProgressResponse> {
        let user_thing = self.users.get_ctx_user_thing().await?;
        let entries = self.catalog.list().await?;
        let records = self.progress.list_by_user(user_thing).await?;

        let by_task: HashMap<String, QuestProgress> = records
            .into_iter()
            .map(|r| (r.waitlist_task.id.to_raw(), r))
            .collect();

        let total_count = entries.len();
        let mut completed_count = 0;
        let quests: Vec<QuestProgressView> = entries
            .into_iter()
            .map(|entry| {
                let record = by_task.get(&entry.task_id);
                if record.map(|r| r.status) == Some(QuestStatus::Completed) {
                    completed_count += 1;
                }
                Self::view(entry, record)
            })
            .collect();

        let overall_progress = if total_count == 0 {
            0
        } else {
            (completed_count as f64 / total_count as f64 * 100.0).round() as u8
        };

        Ok(WaitlistProgressResponse {
            quests,
            completed_count,
            total_count,
            overall_progress,
        })
    }

    fn view(entry: WaitlistTask, record: Option<&QuestProgress>) -> QuestProgressView {
        QuestProgressView {
            task_id: entry.task_id,
            title: entry.title,
            description: entry.description,
            category: entry.category,
            task_type: entry.task_type,
            required_value: entry.required_value,
            status: record.map(|r| r.status).unwrap_or(QuestStatus::NotStarted),
            progress: record.map(|r| r.progress).unwrap_or(0),
            completed_at: record.and_then(|r| r.completed_at),
        }
    }
}
