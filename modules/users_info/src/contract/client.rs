use async_trait::async_trait;

use crate::contract::model::{NewUser, User};

/// Public API trait for the users_info module that other modules can use.
///
/// Errors are `anyhow::Error` wrapping [`crate::contract::error::UsersInfoError`];
/// callers downcast to react to a specific kind.
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// Get the first user with the given id
    async fn get_user(&self, id: i64) -> anyhow::Result<User>;

    /// List users in insertion order, `skip`/`limit` as in `GET /users`
    async fn list_users(&self, skip: Option<i64>, limit: Option<i64>) -> anyhow::Result<Vec<User>>;

    /// Create a new user
    async fn create_user(&self, new_user: NewUser) -> anyhow::Result<User>;

    /// Number of stored users
    async fn count_users(&self) -> anyhow::Result<usize>;
}
