use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub task: String,
    pub deadline: String,
    pub username: String,
}

/// Task projection served by `GET /get_tasks/`; ids are not exposed there.
#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct TaskSummary {
    pub task: String,
    pub deadline: String,
}
