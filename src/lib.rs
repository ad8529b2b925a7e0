pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use crate::services::DbService;

/// Builds the application router over a ready database.
pub fn build_router(db: DbService, max_body_size: usize) -> Router {
    Router::new()
        .route("/login/", post(handlers::handle_login))
        .route("/create_user/", post(handlers::handle_register))
        .route("/create_task/", post(handlers::handle_create_task))
        .route("/get_tasks/", get(handlers::handle_get_tasks))
        .layer(
            // The limit layer stays outermost: CorsLayer needs a response
            // body implementing Default, which the limit's body does not.
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(db)
}
