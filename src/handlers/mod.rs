mod auth;
mod task;

pub use auth::{handle_login, handle_register};
pub use task::{handle_create_task, handle_get_tasks};
