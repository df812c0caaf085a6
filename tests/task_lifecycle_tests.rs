mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use baseconnect_server::{
    entities::task::{
        submission_entity::{Submission, SubmissionStatus},
        task_entity::{Task, TaskStatus},
    },
    models::view::task::TaskView,
};
use helpers::{create_role_user, create_test_server, TestCtx};

async fn create_task(t: &TestCtx, token: &str, reward: f64) -> Task {
    let res = t
        .server
        .post("/api/tasks")
        .authorization_bearer(token)
        .json(&json!({
            "title": "Write integration docs",
            "description": "Cover the public API surface",
            "reward": reward,
            "tags": ["docs", "rust"]
        }))
        .await;
    res.assert_status_ok();
    res.json::<Task>()
}

async fn apply(t: &TestCtx, token: &str, task_id: &str) -> axum_test::TestResponse {
    t.server
        .post(&format!("/api/tasks/{task_id}/apply"))
        .authorization_bearer(token)
        .json(&json!({ "cover_letter": "I can do this" }))
        .await
}

#[tokio::test]
async fn create_requires_creator_role() {
    let t = create_test_server().await;
    let (contributor_token, _) = create_role_user(&t.server, "contributor").await;

    let res = t
        .server
        .post("/api/tasks")
        .authorization_bearer(&contributor_token)
        .json(&json!({ "title": "t", "description": "d", "reward": 1.0 }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn created_task_escrows_full_reward() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;

    let task = create_task(&t, &creator_token, 100.0).await;
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.reward, 100.0);
    assert_eq!(task.escrow_amount, 100.0);
    assert_eq!(task.platform_fee, 0.0);
    assert_eq!(task.applicants, 0);
}

#[tokio::test]
async fn list_filters_by_status() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    create_task(&t, &creator_token, 10.0).await;
    create_task(&t, &creator_token, 20.0).await;

    let res = t.server.get("/api/tasks?status=pending").await;
    res.assert_status_ok();
    let tasks: Vec<TaskView> = res.json();
    assert_eq!(tasks.len(), 2);

    let res = t.server.get("/api/tasks?status=completed").await;
    res.assert_status_ok();
    let tasks: Vec<TaskView> = res.json();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn filtered_list_is_newest_first() {
    let t = create_test_server().await;
    let (creator_token, creator) = create_role_user(&t.server, "creator").await;

    for i in 0..6 {
        let res = t
            .server
            .post("/api/tasks")
            .authorization_bearer(&creator_token)
            .json(&json!({
                "title": format!("batch task {i}"),
                "description": "ordering check",
                "reward": 1.0
            }))
            .await;
        res.assert_status_ok();
    }

    let res = t.server.get("/api/tasks?status=pending").await;
    res.assert_status_ok();
    let tasks: Vec<TaskView> = res.json();
    let titles: Vec<String> = tasks.iter().map(|t| t.title.clone()).collect();
    let expected: Vec<String> = (0..6).rev().map(|i| format!("batch task {i}")).collect();
    assert_eq!(titles, expected);

    // filtering by creator keeps the same order
    let res = t
        .server
        .get(&format!("/api/tasks?creator={}", creator.id.to_raw()))
        .await;
    res.assert_status_ok();
    let tasks: Vec<TaskView> = res.json();
    let titles: Vec<String> = tasks.iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn duplicate_application_conflicts() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    let (contributor_token, _) = create_role_user(&t.server, "contributor").await;
    let task = create_task(&t, &creator_token, 50.0).await;
    let task_id = task.id.unwrap().to_raw();

    apply(&t, &contributor_token, &task_id).await.assert_status_ok();
    apply(&t, &contributor_token, &task_id)
        .await
        .assert_status(StatusCode::CONFLICT);

    let res = t.server.get(&format!("/api/tasks/{task_id}")).await;
    res.assert_status_ok();
    let view: TaskView = res.json();
    assert_eq!(view.applicants, 1);
}

#[tokio::test]
async fn creator_can_not_apply_to_own_task() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    let task = create_task(&t, &creator_token, 50.0).await;
    let task_id = task.id.unwrap().to_raw();

    apply(&t, &creator_token, &task_id)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn accept_assigns_and_rejects_siblings() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    let (first_token, first_user) = create_role_user(&t.server, "contributor").await;
    let (second_token, _) = create_role_user(&t.server, "contributor").await;
    let task = create_task(&t, &creator_token, 50.0).await;
    let task_id = task.id.unwrap().to_raw();

    apply(&t, &first_token, &task_id).await.assert_status_ok();
    apply(&t, &second_token, &task_id).await.assert_status_ok();

    let res = t
        .server
        .get(&format!("/api/tasks/{task_id}/applicants"))
        .authorization_bearer(&creator_token)
        .await;
    res.assert_status_ok();
    let applicants: serde_json::Value = res.json();
    let list = applicants.as_array().unwrap();
    assert_eq!(list.len(), 2);
    let first_application_id = list
        .iter()
        .find(|a| a["applicant"]["id"] == serde_json::to_value(&first_user.id).unwrap())
        .unwrap()["id"]
        .clone();
    let first_application_id: surrealdb::sql::Thing =
        serde_json::from_value(first_application_id).unwrap();

    // only the creator can accept
    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/accept"))
        .authorization_bearer(&first_token)
        .json(&json!({ "application_id": first_application_id.to_raw() }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/accept"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "application_id": first_application_id.to_raw() }))
        .await;
    res.assert_status_ok();
    let task: Task = res.json();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.assignee, Some(first_user.id.clone()));

    // sibling application got rejected
    let res = t
        .server
        .get(&format!("/api/tasks/{task_id}/applicants"))
        .authorization_bearer(&creator_token)
        .await;
    let applicants: serde_json::Value = res.json();
    let statuses: Vec<&str> = applicants
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"accepted"));
    assert!(statuses.contains(&"rejected"));

    // accepting again conflicts, the task already moved on
    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/accept"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "application_id": first_application_id.to_raw() }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
}

async fn setup_in_progress_task(t: &TestCtx) -> (String, String, String) {
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    let (contributor_token, contributor) = create_role_user(&t.server, "contributor").await;
    let task = create_task(t, &creator_token, 100.0).await;
    let task_id = task.id.unwrap().to_raw();

    apply(t, &contributor_token, &task_id).await.assert_status_ok();
    let res = t
        .server
        .get(&format!("/api/tasks/{task_id}/applicants"))
        .authorization_bearer(&creator_token)
        .await;
    let applicants: serde_json::Value = res.json();
    let application_id: surrealdb::sql::Thing =
        serde_json::from_value(applicants[0]["id"].clone()).unwrap();
    let _ = contributor;

    t.server
        .post(&format!("/api/tasks/{task_id}/accept"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "application_id": application_id.to_raw() }))
        .await
        .assert_status_ok();

    (creator_token, contributor_token, task_id)
}

#[tokio::test]
async fn only_assignee_submits_work() {
    let t = create_test_server().await;
    let (creator_token, contributor_token, task_id) = setup_in_progress_task(&t).await;

    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "content": "not my task" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&contributor_token)
        .json(&json!({ "content": "here is the work" }))
        .await;
    res.assert_status_ok();
    let submission: Submission = res.json();
    assert_eq!(submission.status, SubmissionStatus::Pending);

    // only one open submission at a time
    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&contributor_token)
        .json(&json!({ "content": "double submit" }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn approval_charges_the_platform_fee_once() {
    let t = create_test_server().await;
    let (creator_token, contributor_token, task_id) = setup_in_progress_task(&t).await;

    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&contributor_token)
        .json(&json!({ "content": "here is the work" }))
        .await;
    res.assert_status_ok();
    let submission: Submission = res.json();
    let submission_id = submission.id.unwrap().to_raw();

    let res = t
        .server
        .post(&format!("/api/submissions/{submission_id}/approve"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "transaction_hash": "0xdeadbeef" }))
        .await;
    res.assert_status_ok();
    let task: Task = res.json();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.platform_fee, 10.0);
    assert_eq!(task.escrow_amount, 90.0);
    assert_eq!(task.transaction_hash.as_deref(), Some("0xdeadbeef"));

    // the fee is never charged twice
    let res = t
        .server
        .post(&format!("/api/submissions/{submission_id}/approve"))
        .authorization_bearer(&creator_token)
        .json(&json!({}))
        .await;
    res.assert_status(StatusCode::CONFLICT);

    let res = t.server.get(&format!("/api/tasks/{task_id}")).await;
    let view: TaskView = res.json();
    assert_eq!(view.platform_fee, 10.0);
    assert_eq!(view.escrow_amount, 90.0);
}

#[tokio::test]
async fn rejection_allows_resubmission() {
    let t = create_test_server().await;
    let (creator_token, contributor_token, task_id) = setup_in_progress_task(&t).await;

    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&contributor_token)
        .json(&json!({ "content": "first try" }))
        .await;
    res.assert_status_ok();
    let submission: Submission = res.json();
    let submission_id = submission.id.unwrap().to_raw();

    let res = t
        .server
        .post(&format!("/api/submissions/{submission_id}/reject"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "note": "needs more detail" }))
        .await;
    res.assert_status_ok();
    let rejected: Submission = res.json();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.review_note.as_deref(), Some("needs more detail"));

    let res = t.server.get(&format!("/api/tasks/{task_id}")).await;
    let view: TaskView = res.json();
    assert!(!view.has_submission);
    assert_eq!(view.status, TaskStatus::InProgress);

    // contributor can try again
    let res = t
        .server
        .post(&format!("/api/tasks/{task_id}/submit"))
        .authorization_bearer(&contributor_token)
        .json(&json!({ "content": "second try" }))
        .await;
    res.assert_status_ok();

    let res = t
        .server
        .get(&format!("/api/tasks/{task_id}/submissions"))
        .authorization_bearer(&creator_token)
        .await;
    res.assert_status_ok();
    let submissions: Vec<Submission> = res.json();
    assert_eq!(submissions.len(), 2);
}

#[tokio::test]
async fn only_creator_updates_and_deletes() {
    let t = create_test_server().await;
    let (creator_token, _) = create_role_user(&t.server, "creator").await;
    let (other_token, _) = create_role_user(&t.server, "contributor").await;
    let task = create_task(&t, &creator_token, 5.0).await;
    let task_id = task.id.unwrap().to_raw();

    let res = t
        .server
        .put(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&other_token)
        .json(&json!({ "title": "hijacked" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = t
        .server
        .put(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&creator_token)
        .json(&json!({ "title": "Updated title" }))
        .await;
    res.assert_status_ok();
    let updated: Task = res.json();
    assert_eq!(updated.title, "Updated title");

    let res = t
        .server
        .delete(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&other_token)
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    t.server
        .delete(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&creator_token)
        .await
        .assert_status_ok();

    let res = t.server.get(&format!("/api/tasks/{task_id}")).await;
    res.assert_status(StatusCode::NOT_FOUND);
}
