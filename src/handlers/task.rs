use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use crate::errors::{AppError, AppResult};
use crate::models::{TaskForm, TasksQuery};
use crate::services::{DbService, TaskCreation};

pub async fn handle_create_task(
    State(db): State<DbService>,
    Json(form): Json<TaskForm>,
) -> AppResult<Json<Value>> {
    let outcome = db
        .create_task(&form.task, &form.deadline, &form.user)
        .await
        .map_err(AppError::TaskCreation)?;

    let body = match outcome {
        TaskCreation::Created(tasks) => {
            tracing::info!("Created task for {}: {}", form.user, form.task);
            json!({ "status": "Task Created!", "tasks": tasks })
        }
        TaskCreation::UserNotFound => {
            tracing::debug!("Task submitted for unknown user: {}", form.user);
            json!({ "status": "User Not Found!" })
        }
        TaskCreation::Duplicate => {
            tracing::debug!("Duplicate task for {}: {}", form.user, form.task);
            json!({ "status": "Duplicate Task — Not Added." })
        }
    };

    Ok(Json(body))
}

// Storage failures here are reported in the body with a 200 status,
// unlike the other endpoints.
pub async fn handle_get_tasks(
    State(db): State<DbService>,
    Query(query): Query<TasksQuery>,
) -> Json<Value> {
    match db.user_exists(&query.username).await {
        Ok(true) => {}
        Ok(false) => return Json(json!({ "status": "User Not Found!" })),
        Err(e) => {
            tracing::error!("[USER CHECK ERROR] {:?}", e);
            return Json(json!({ "status": "Error checking user!" }));
        }
    }

    match db.task_summaries(&query.username).await {
        Ok(tasks) => Json(json!({ "tasks": tasks })),
        Err(e) => {
            tracing::error!("[FETCH TASKS ERROR] {:?}", e);
            Json(json!({ "status": "Error fetching tasks!" }))
        }
    }
}
