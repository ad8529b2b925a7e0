use serde::Serialize;
use sqlx::FromRow;

/// A row of the `users` table, returned as-is by the registration endpoint.
#[derive(Debug, Serialize, FromRow, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,  // cleartext, compared verbatim on login
}
