use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::{
    entities::task::{
        application_entity::{ApplicantView, Application},
        submission_entity::Submission,
        task_entity::Task,
    },
    middleware::{
        bearer_auth::BearerAuth,
        ctx::Ctx,
        error::CtxResult,
        mw_ctx::CtxState,
        utils::extractor_utils::JsonValidated,
    },
    models::view::task::TaskView,
    services::task_service::{
        AcceptInput, ApplyInput, ApproveInput, RejectInput, SubmitInput, TaskCreateInput,
        TaskListFilter, TaskService, TaskUpdateInput,
    },
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/tasks", post(create_task).get(list_tasks))
        .route(
            "/api/tasks/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/:task_id/apply", post(apply))
        .route("/api/tasks/:task_id/applicants", get(applicants))
        .route("/api/tasks/:task_id/accept", post(accept))
        .route("/api/tasks/:task_id/submit", post(submit))
        .route("/api/tasks/:task_id/submissions", get(submissions))
        .route("/api/submissions/:submission_id/approve", post(approve))
        .route("/api/submissions/:submission_id/reject", post(reject))
}

async fn create_task(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    JsonValidated(input): JsonValidated<TaskCreateInput>,
) -> CtxResult<Json<Task>> {
    let task = TaskService::new(&state, &auth.ctx).create(input).await?;
    Ok(Json(task))
}

async fn list_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(filter): Query<TaskListFilter>,
) -> CtxResult<Json<Vec<TaskView>>> {
    let tasks = TaskService::new(&state, &ctx).list(filter).await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<TaskView>> {
    let task = TaskService::new(&state, &ctx).get(&task_id).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
    JsonValidated(input): JsonValidated<TaskUpdateInput>,
) -> CtxResult<Json<Task>> {
    let task = TaskService::new(&state, &auth.ctx)
        .update(&task_id, input)
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    TaskService::new(&state, &auth.ctx).delete(&task_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn apply(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
    JsonValidated(input): JsonValidated<ApplyInput>,
) -> CtxResult<Json<Application>> {
    let application = TaskService::new(&state, &auth.ctx)
        .apply(&task_id, input)
        .await?;
    Ok(Json(application))
}

async fn applicants(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
) -> CtxResult<Json<Vec<ApplicantView>>> {
    let list = TaskService::new(&state, &auth.ctx)
        .applicants(&task_id)
        .await?;
    Ok(Json(list))
}

async fn accept(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
    JsonValidated(input): JsonValidated<AcceptInput>,
) -> CtxResult<Json<Task>> {
    let task = TaskService::new(&state, &auth.ctx)
        .accept(&task_id, input)
        .await?;
    Ok(Json(task))
}

async fn submit(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
    JsonValidated(input): JsonValidated<SubmitInput>,
) -> CtxResult<Json<Submission>> {
    let submission = TaskService::new(&state, &auth.ctx)
        .submit(&task_id, input)
        .await?;
    Ok(Json(submission))
}

async fn submissions(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
) -> CtxResult<Json<Vec<Submission>>> {
    let list = TaskService::new(&state, &auth.ctx)
        .submissions(&task_id)
        .await?;
    Ok(Json(list))
}

async fn approve(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(submission_id): Path<String>,
    JsonValidated(input): JsonValidated<ApproveInput>,
) -> CtxResult<Json<Task>> {
    let task = TaskService::new(&state, &auth.ctx)
        .approve(&submission_id, input)
        .await?;
    Ok(Json(task))
}

async fn reject(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(submission_id): Path<String>,
    JsonValidated(input): JsonValidated<RejectInput>,
) -> CtxResult<Json<Submission>> {
    let submission = TaskService::new(&state, &auth.ctx)
        .reject(&submission_id, input)
        .await?;
    Ok(Json(submission))
}
