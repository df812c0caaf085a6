use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::sql::{Datetime, Thing};
use validator::Validate;

use crate::{
    entities::{
        task::{
            application_entity::{ApplicantView, Application, ApplicationDbService, ApplicationStatus},
            submission_entity::{Submission, SubmissionDbService, SubmissionStatus},
            task_entity::{Task, TaskCreate, TaskDbService, TaskStatus},
        },
        user_auth::local_user_entity::{LocalUserDbService, UserRole},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::CtxState,
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
    models::view::task::TaskView,
    utils::validate_utils::{trim_string, validate_tags},
};

#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreateInput {
    #[validate(length(min = 1, message = "Title required"))]
    #[serde(deserialize_with = "trim_string")]
    pub title: String,
    #[validate(length(min = 1, message = "Description required"))]
    #[serde(deserialize_with = "trim_string")]
    pub description: String,
    pub reward: f64,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(custom(function = validate_tags))]
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TaskUpdateInput {
    #[validate(length(min = 1, message = "Title required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description required"))]
    pub description: Option<String>,
    pub reward: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyInput {
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInput {
    #[validate(length(min = 1, message = "application_id required"))]
    pub application_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitInput {
    #[validate(length(min = 1, message = "Content required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveInput {
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectInput {
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TaskListFilter {
    pub status: Option<TaskStatus>,
    pub creator: Option<String>,
    pub assignee: Option<String>,
}

/// platform fee is 10% of reward, rounded to 6 decimal places
pub fn compute_platform_fee(reward: f64, rate: f64) -> f64 {
    (reward * rate * 1_000_000.0).round() / 1_000_000.0
}

pub struct TaskService<'a> {
    ctx: &'a Ctx,
    state: &'a CtxState,
    users: LocalUserDbService<'a>,
    tasks: TaskDbService<'a>,
    applications: ApplicationDbService<'a>,
    submissions: SubmissionDbService<'a>,
}

impl<'a> TaskService<'a> {
    pub fn new(state: &'a CtxState, ctx: &'a Ctx) -> Self {
        Self {
            ctx,
            state,
            users: LocalUserDbService {
                db: &state.db.client,
                ctx,
            },
            tasks: TaskDbService {
                db: &state.db.client,
                ctx,
            },
            applications: ApplicationDbService {
                db: &state.db.client,
                ctx,
            },
            submissions: SubmissionDbService {
                db: &state.db.client,
                ctx,
            },
        }
    }

    pub async fn create(&self, input: TaskCreateInput) -> CtxResult<Task> {
        input.validate()?;

        if !input.reward.is_finite() || input.reward < 0.0 {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                source: "reward must be a finite number >= 0".to_string(),
            }));
        }

        let creator = self.require_role(UserRole::Creator).await?;

        self.tasks
            .create(TaskCreate {
                title: input.title,
                description: input.description,
                status: TaskStatus::Pending,
                creator,
                reward: input.reward,
                deadline: input.deadline.map(Datetime::from),
                tags: input.tags,
                escrow_amount: input.reward,
            })
            .await
    }

    pub async fn list(&self, filter: TaskListFilter) -> CtxResult<Vec<TaskView>> {
        let creator = match filter.creator {
            Some(v) => Some(get_str_thing(&v).map_err(|e| self.ctx.to_ctx_error(e))?),
            None => None,
        };
        let assignee = match filter.assignee {
            Some(v) => Some(get_str_thing(&v).map_err(|e| self.ctx.to_ctx_error(e))?),
            None => None,
        };
        self.tasks
            .list::<TaskView>(filter.status, creator, assignee, None)
            .await
    }

    pub async fn get(&self, task_id: &str) -> CtxResult<TaskView> {
        let task_thing = self.task_thing(task_id)?;
        self.tasks.get_by_id::<TaskView>(&task_thing).await
    }

    pub async fn update(&self, task_id: &str, input: TaskUpdateInput) -> CtxResult<Task> {
        input.validate()?;

        let (task, _) = self.require_task_creator(task_id).await?;
        let task_thing = self.task_thing(task_id)?;

        let mut record = task;
        if let Some(title) = input.title {
            record.title = title;
        }
        if let Some(description) = input.description {
            record.description = description;
        }
        if let Some(reward) = input.reward {
            if !reward.is_finite() || reward < 0.0 {
                return Err(self.ctx.to_ctx_error(AppError::Validation {
                    source: "reward must be a finite number >= 0".to_string(),
                }));
            }
            if record.status == TaskStatus::Pending {
                record.escrow_amount = reward;
            }
            record.reward = reward;
        }
        if let Some(deadline) = input.deadline {
            record.deadline = Some(Datetime::from(deadline));
        }
        if let Some(tags) = input.tags {
            record.tags = tags;
        }

        self.tasks.update_fields(task_thing, record).await
    }

    pub async fn delete(&self, task_id: &str) -> CtxResult<()> {
        self.require_task_creator(task_id).await?;
        let task_thing = self.task_thing(task_id)?;
        self.tasks.delete(task_thing).await
    }

    pub async fn apply(&self, task_id: &str, input: ApplyInput) -> CtxResult<Application> {
        input.validate()?;

        let applicant = self.require_role(UserRole::Contributor).await?;
        let task_thing = self.task_thing(task_id)?;
        let task = self.tasks.get(IdentIdName::Id(task_thing.clone())).await?;

        if task.creator == applicant {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: "applicant must not be the task creator".to_string(),
            }));
        }

        let existing = self
            .applications
            .get_by_task_and_applicant(task_thing.clone(), applicant.clone())
            .await?;
        if existing.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "already applied".to_string(),
            }));
        }

        let qry = "
            BEGIN TRANSACTION;
                CREATE application SET task=$task, applicant=$applicant, status=$status, cover_letter=$cover_letter;
                UPDATE $task SET applicants += 1;
            COMMIT TRANSACTION;
        ";
        let mut res = self
            .state
            .db
            .client
            .query(qry)
            .bind(("task", task_thing))
            .bind(("applicant", applicant))
            .bind(("status", ApplicationStatus::Pending))
            .bind(("cover_letter", input.cover_letter))
            .await?;
        let created: Option<Application> = res.take(0)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "application create returned no record".to_string(),
        }))
    }

    pub async fn applicants(&self, task_id: &str) -> CtxResult<Vec<ApplicantView>> {
        self.require_task_creator(task_id).await?;
        let task_thing = self.task_thing(task_id)?;
        self.applications.list_by_task(task_thing).await
    }

    pub async fn accept(&self, task_id: &str, input: AcceptInput) -> CtxResult<Task> {
        input.validate()?;

        let (task, _) = self.require_task_creator(task_id).await?;
        let task_thing = self.task_thing(task_id)?;

        if task.status != TaskStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "task already has an assignee".to_string(),
            }));
        }

        let application_thing = get_str_thing(&input.application_id)
            .map_err(|e| self.ctx.to_ctx_error(e))?;
        let application = self
            .applications
            .get_by_id(application_thing.clone())
            .await?
            .ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: input.application_id.clone(),
            }))?;

        if application.task != task_thing {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                source: "application does not belong to this task".to_string(),
            }));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "application already resolved".to_string(),
            }));
        }

        // one accept resolves every sibling application in the same write
        let qry = "
            BEGIN TRANSACTION;
                UPDATE $application SET status='accepted';
                UPDATE application SET status='rejected' WHERE task=$task AND status='pending' AND id != $application;
                UPDATE $task SET status='in_progress', assignee=$assignee;
            COMMIT TRANSACTION;
        ";
        let mut res = self
            .state
            .db
            .client
            .query(qry)
            .bind(("application", application_thing))
            .bind(("task", task_thing.clone()))
            .bind(("assignee", application.applicant))
            .await?;
        let updated: Option<Task> = res.take(2)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "task accept returned no record".to_string(),
        }))
    }

    pub async fn submit(&self, task_id: &str, input: SubmitInput) -> CtxResult<Submission> {
        input.validate()?;

        let actor = self.users.get_ctx_user_thing().await?;
        let task_thing = self.task_thing(task_id)?;
        let task = self.tasks.get(IdentIdName::Id(task_thing.clone())).await?;

        if task.assignee.as_ref() != Some(&actor) {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: "task assignee".to_string(),
            }));
        }
        if task.status != TaskStatus::InProgress {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "task is not in progress".to_string(),
            }));
        }

        let pending = self.submissions.get_pending_by_task(task_thing.clone()).await?;
        if pending.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "a pending submission already exists".to_string(),
            }));
        }

        let qry = "
            BEGIN TRANSACTION;
                CREATE submission SET task=$task, contributor=$contributor, content=$content, status=$status;
                UPDATE $task SET has_submission = true;
            COMMIT TRANSACTION;
        ";
        let mut res = self
            .state
            .db
            .client
            .query(qry)
            .bind(("task", task_thing))
            .bind(("contributor", actor))
            .bind(("content", input.content))
            .bind(("status", SubmissionStatus::Pending))
            .await?;
        let created: Option<Submission> = res.take(0)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "submission create returned no record".to_string(),
        }))
    }

    pub async fn submissions(&self, task_id: &str) -> CtxResult<Vec<Submission>> {
        let actor = self.users.get_ctx_user_thing().await?;
        let task_thing = self.task_thing(task_id)?;
        let task = self.tasks.get(IdentIdName::Id(task_thing.clone())).await?;
        if task.creator != actor && task.assignee.as_ref() != Some(&actor) {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: "task creator or assignee".to_string(),
            }));
        }
        self.submissions.list_by_task(task_thing).await
    }

    pub async fn approve(&self, submission_id: &str, input: ApproveInput) -> CtxResult<Task> {
        input.validate()?;

        let (submission, task) = self.require_submission_task_creator(submission_id).await?;

        if task.status == TaskStatus::Completed {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "task is already completed".to_string(),
            }));
        }
        if submission.status != SubmissionStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "submission already reviewed".to_string(),
            }));
        }

        let fee = compute_platform_fee(task.reward, self.state.platform_fee_rate);
        let escrow = task.escrow_amount - fee;
        let submission_thing = submission.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "submission has no id".to_string(),
            },
        ))?;

        let qry = "
            BEGIN TRANSACTION;
                UPDATE $submission SET status='approved', reviewed_at=time::now();
                UPDATE $task SET status='completed', platform_fee=$fee, escrow_amount=$escrow, transaction_hash=$tx;
            COMMIT TRANSACTION;
        ";
        let mut res = self
            .state
            .db
            .client
            .query(qry)
            .bind(("submission", submission_thing))
            .bind(("task", submission.task))
            .bind(("fee", fee))
            .bind(("escrow", escrow))
            .bind(("tx", input.transaction_hash))
            .await?;
        let updated: Option<Task> = res.take(1)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "task approve returned no record".to_string(),
        }))
    }

    pub async fn reject(&self, submission_id: &str, input: RejectInput) -> CtxResult<Submission> {
        input.validate()?;

        let (submission, _task) = self.require_submission_task_creator(submission_id).await?;

        if submission.status != SubmissionStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "submission already reviewed".to_string(),
            }));
        }

        let submission_thing = submission.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "submission has no id".to_string(),
            },
        ))?;

        // resubmission allowed once the flag clears
        let qry = "
            BEGIN TRANSACTION;
                UPDATE $submission SET status='rejected', reviewed_at=time::now(), review_note=$note;
                UPDATE $task SET has_submission = false;
            COMMIT TRANSACTION;
        ";
        let mut res = self
            .state
            .db
            .client
            .query(qry)
            .bind(("submission", submission_thing))
            .bind(("task", submission.task))
            .bind(("note", input.note))
            .await?;
        let updated: Option<Submission> = res.take(0)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "submission reject returned no record".to_string(),
        }))
    }

    async fn require_role(&self, role: UserRole) -> CtxResult<Thing> {
        let user = self.users.get_ctx_user().await?;
        if user.role != Some(role) {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: format!("role {role}"),
            }));
        }
        user.id.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user has no id".to_string(),
        }))
    }

    async fn require_task_creator(&self, task_id: &str) -> CtxResult<(Task, Thing)> {
        let actor = self.users.get_ctx_user_thing().await?;
        let task_thing = self.task_thing(task_id)?;
        let task = self.tasks.get(IdentIdName::Id(task_thing)).await?;
        if task.creator != actor {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: "task creator".to_string(),
            }));
        }
        Ok((task, actor))
    }

    async fn require_submission_task_creator(
        &self,
        submission_id: &str,
    ) -> CtxResult<(Submission, Task)> {
        let actor = self.users.get_ctx_user_thing().await?;
        let submission_thing =
            get_str_thing(submission_id).map_err(|e| self.ctx.to_ctx_error(e))?;
        let submission = self
            .submissions
            .get_by_id(submission_thing)
            .await?
            .ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: submission_id.to_string(),
            }))?;
        let task = self
            .tasks
            .get(IdentIdName::Id(submission.task.clone()))
            .await?;
        if task.creator != actor {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden {
                required: "task creator".to_string(),
            }));
        }
        Ok((submission, task))
    }

    fn task_thing(&self, task_id: &str) -> CtxResult<Thing> {
        get_str_thing(task_id).map_err(|e| self.ctx.to_ctx_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_is_ten_percent_rounded() {
        assert_eq!(compute_platform_fee(100.0, 0.10), 10.0);
        assert_eq!(compute_platform_fee(0.0, 0.10), 0.0);
        assert_eq!(compute_platform_fee(0.333333333, 0.10), 0.033333);
        assert_eq!(compute_platform_fee(99.999999, 0.10), 10.0);
    }
}
