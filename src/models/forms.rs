use serde::Deserialize;

/// Body of `/login/` and `/create_user/`.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub task: String,
    pub deadline: String,
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub username: String,
}
