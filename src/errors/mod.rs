// Handler-level error type and its result alias, built on thiserror.
use thiserror::Error;

pub mod response;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User already exists!")]
    UserExists,

    // The storage error is kept as the source so it can be logged, but the
    // Display text is the only thing a client ever sees.
    #[error("Login failed.")]
    Login(#[source] sqlx::Error),

    #[error("User creation failed.")]
    UserCreation(#[source] sqlx::Error),

    #[error("Task creation failed.")]
    TaskCreation(#[source] sqlx::Error),
}

impl AppError {
    /// Log label for failures whose cause stays server-side.
    pub fn log_tag(&self) -> Option<&'static str> {
        match self {
            AppError::UserExists => None,
            AppError::Login(_) => Some("LOGIN ERROR"),
            AppError::UserCreation(_) => Some("CREATE USER ERROR"),
            AppError::TaskCreation(_) => Some("CREATE TASK ERROR"),
        }
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
