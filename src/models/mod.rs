mod user;
mod forms;
mod task;

pub use user::User;
pub use forms::{Credentials, TaskForm, TasksQuery};
pub use task::{Task, TaskSummary};
