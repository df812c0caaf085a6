use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::{
    entities::waitlist::waitlist_task_entity::WaitlistTask,
    middleware::{bearer_auth::BearerAuth, ctx::Ctx, error::CtxResult, mw_ctx::CtxState},
    services::quest_service::{QuestProgressView, QuestService, WaitlistProgressResponse},
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/waitlist/tasks", get(catalog))
        .route("/api/waitlist/progress", get(progress))
        .route("/api/waitlist/tasks/:task_id/verify", post(verify))
}

async fn catalog(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<WaitlistTask>>> {
    let entries = QuestService::new(&state, &ctx).catalog().await?;
    Ok(Json(entries))
}

async fn progress(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
) -> CtxResult<Json<WaitlistProgressResponse>> {
    let response = QuestService::new(&state, &auth.ctx).get_progress().await?;
    Ok(Json(response))
}

async fn verify(
    State(state): State<Arc<CtxState>>,
    auth: BearerAuth,
    Path(task_id): Path<String>,
) -> CtxResult<Json<QuestProgressView>> {
    let view = QuestService::new(&state, &auth.ctx).verify(&task_id).await?;
    Ok(Json(view))
}
