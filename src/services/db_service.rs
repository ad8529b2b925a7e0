use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use crate::config::DatabaseConfig;
use crate::models::{Task, TaskSummary, User};

// Embedded so the binary does not depend on its working directory
const SCHEMA: &[&str] = &[
    include_str!("../../migrations/0001_create_users.sql"),
    include_str!("../../migrations/0002_create_tasks.sql"),
];

// Takes the write lock up front. A deferred transaction that reads first and
// then writes fails with SQLITE_BUSY instead of waiting when another
// connection is already writing.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Outcome of a registration attempt.
#[derive(Debug)]
pub enum Registration {
    Created(Vec<User>),
    AlreadyExists,
}

/// Outcome of a task creation attempt.
#[derive(Debug)]
pub enum TaskCreation {
    Created(Vec<Task>),
    UserNotFound,
    Duplicate,
}

/// Pooled access to the `users` and `tasks` tables.
///
/// Every method acquires its own connection (or transaction) from the pool
/// and hands it back when the future completes, whichever way it completes.
#[derive(Clone)]
pub struct DbService {
    pool: SqlitePool,
}

impl DbService {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Schema-initialized database that lives as long as the returned service.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        // Each new connection to `:memory:` opens a fresh empty database, so
        // the pool is pinned to a single connection that never expires.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables if they are missing. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await
    }

    /// Looks up the user whose username and password both match exactly.
    pub async fn find_user(&self, username: &str, password: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        user_exists_on(&mut conn, username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, password FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_all_tasks(&self) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT id, task, deadline, username FROM tasks ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn task_summaries(&self, username: &str) -> Result<Vec<TaskSummary>, sqlx::Error> {
        sqlx::query_as::<_, TaskSummary>(
            "SELECT task, deadline FROM tasks WHERE username = ? ORDER BY id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
    }

    /// Inserts a user unless the username is taken, then returns every user row.
    pub async fn register_user(&self, username: &str, password: &str) -> Result<Registration, sqlx::Error> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        if user_exists_on(&mut tx, username).await? {
            tx.rollback().await?;
            return Ok(Registration::AlreadyExists);
        }

        let inserted = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {}
            // The UNIQUE constraint backs up the existence check above
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!("Concurrent registration for {}: {}", username, e);
                tx.rollback().await?;
                return Ok(Registration::AlreadyExists);
            }
            Err(e) => return Err(e),
        }

        let users = sqlx::query_as::<_, User>("SELECT id, username, password FROM users ORDER BY id")
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Registration::Created(users))
    }

    /// Inserts a task for an existing user unless the exact
    /// (task, deadline, username) triple is already stored.
    pub async fn create_task(&self, task: &str, deadline: &str, username: &str) -> Result<TaskCreation, sqlx::Error> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        if !user_exists_on(&mut tx, username).await? {
            tx.rollback().await?;
            return Ok(TaskCreation::UserNotFound);
        }

        let duplicate = sqlx::query(
            "SELECT 1 FROM tasks WHERE task = ? AND deadline = ? AND username = ?",
        )
        .bind(task)
        .bind(deadline)
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

        if duplicate.is_some() {
            tx.rollback().await?;
            return Ok(TaskCreation::Duplicate);
        }

        sqlx::query("INSERT INTO tasks (task, deadline, username) VALUES (?, ?, ?)")
            .bind(task)
            .bind(deadline)
            .bind(username)
            .execute(&mut *tx)
            .await?;

        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, task, deadline, username FROM tasks WHERE username = ? ORDER BY id",
        )
        .bind(username)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TaskCreation::Created(tasks))
    }

    /// Logs the tables and their rows. Failures are logged per section and
    /// never abort startup. Passwords are left out.
    pub async fn log_snapshot(&self) {
        match sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(tables) => tracing::info!("Database tables: {:?}", tables),
            Err(e) => tracing::error!("Failed to list tables: {}", e),
        }

        match self.list_users().await {
            Ok(users) => {
                tracing::info!("{} registered user(s)", users.len());
                for user in &users {
                    tracing::info!(id = user.id, username = %user.username, "user");
                }
            }
            Err(e) => tracing::error!("Failed to query users: {}", e),
        }

        match self.list_all_tasks().await {
            Ok(tasks) => {
                tracing::info!("{} stored task(s)", tasks.len());
                for task in &tasks {
                    tracing::info!(
                        id = task.id,
                        task = %task.task,
                        deadline = %task.deadline,
                        username = %task.username,
                        "task"
                    );
                }
            }
            Err(e) => tracing::error!("Failed to query tasks: {}", e),
        }
    }
}

async fn user_exists_on(conn: &mut SqliteConnection, username: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(username: &str, password: &str) -> DbService {
        let db = DbService::in_memory().await.unwrap();
        match db.register_user(username, password).await.unwrap() {
            Registration::Created(_) => db,
            other => panic!("seed registration failed: {:?}", other),
        }
    }

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let db = seeded("alice", "pw1").await;
        db.init_schema().await.unwrap();
        assert_eq!(db.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_returns_every_user() {
        let db = seeded("alice", "pw1").await;
        let users = match db.register_user("bob", "pw2").await.unwrap() {
            Registration::Created(users) => users,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);
        assert_eq!(users[1].password, "pw2");
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let db = seeded("alice", "pw1").await;
        let outcome = db.register_user("alice", "other").await.unwrap();
        assert!(matches!(outcome, Registration::AlreadyExists));

        // original password untouched
        assert!(db.find_user("alice", "pw1").await.unwrap().is_some());
        assert!(db.find_user("alice", "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_user_requires_exact_match() {
        let db = seeded("alice", "pw1").await;
        assert!(db.find_user("alice", "pw1").await.unwrap().is_some());
        assert!(db.find_user("alice", "PW1").await.unwrap().is_none());
        assert!(db.find_user("Alice", "pw1").await.unwrap().is_none());
        assert!(db.find_user("mallory", "pw1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_task_for_unknown_user_inserts_nothing() {
        let db = DbService::in_memory().await.unwrap();
        let outcome = db.create_task("buy milk", "2024-01-01", "ghost").await.unwrap();
        assert!(matches!(outcome, TaskCreation::UserNotFound));
        assert!(db.list_all_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_triple_is_not_inserted() {
        let db = seeded("alice", "pw1").await;
        let first = db.create_task("buy milk", "2024-01-01", "alice").await.unwrap();
        assert!(matches!(first, TaskCreation::Created(ref tasks) if tasks.len() == 1));

        let second = db.create_task("buy milk", "2024-01-01", "alice").await.unwrap();
        assert!(matches!(second, TaskCreation::Duplicate));
        assert_eq!(db.list_all_tasks().await.unwrap().len(), 1);

        // a different deadline is a different task
        let third = db.create_task("buy milk", "2024-01-02", "alice").await.unwrap();
        assert!(matches!(third, TaskCreation::Created(ref tasks) if tasks.len() == 2));
    }

    #[tokio::test]
    async fn created_tasks_are_scoped_to_their_owner() {
        let db = seeded("alice", "pw1").await;
        db.register_user("bob", "pw2").await.unwrap();
        db.create_task("walk dog", "2024-02-01", "bob").await.unwrap();

        let tasks = match db.create_task("buy milk", "2024-01-01", "alice").await.unwrap() {
            TaskCreation::Created(tasks) => tasks,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].username, "alice");
        assert_eq!(tasks[0].task, "buy milk");
    }

    #[tokio::test]
    async fn summaries_are_empty_for_user_without_tasks() {
        let db = seeded("alice", "pw1").await;
        assert!(db.user_exists("alice").await.unwrap());
        assert!(!db.user_exists("bob").await.unwrap());
        assert!(db.task_summaries("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_key_rejects_orphan_task() {
        let db = DbService::in_memory().await.unwrap();
        let result = sqlx::query("INSERT INTO tasks (task, deadline, username) VALUES (?, ?, ?)")
            .bind("orphan")
            .bind("never")
            .bind("nobody")
            .execute(db.pool())
            .await;
        assert!(result.is_err());
    }
}
