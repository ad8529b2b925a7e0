use axum::{
    extract::State,
    Json,
};
use serde_json::{json, Value};
use crate::errors::{AppError, AppResult};
use crate::models::Credentials;
use crate::services::{DbService, Registration};

#[axum::debug_handler]
pub async fn handle_login(
    State(db): State<DbService>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<Value>> {
    tracing::info!("Login attempt for user: {}", credentials.username);

    let user = db
        .find_user(&credentials.username, &credentials.password)
        .await
        .map_err(AppError::Login)?;

    match user {
        Some(_) => Ok(Json(json!({ "status": "Logged in" }))),
        None => {
            tracing::info!("No user matches the credentials for: {}", credentials.username);
            Ok(Json(json!({ "status": "User Not Found!" })))
        }
    }
}

pub async fn handle_register(
    State(db): State<DbService>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<Value>> {
    let outcome = db
        .register_user(&credentials.username, &credentials.password)
        .await
        .map_err(AppError::UserCreation)?;

    match outcome {
        Registration::Created(users) => {
            tracing::info!("Registered user: {}", credentials.username);
            Ok(Json(json!({ "status": "User Created!", "users": users })))
        }
        Registration::AlreadyExists => {
            tracing::info!("Username already taken: {}", credentials.username);
            Err(AppError::UserExists)
        }
    }
}
