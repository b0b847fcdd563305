//! Process-local adapter for [`UsersRepository`].
//!
//! Records live in a `Vec` behind a `parking_lot::RwLock`. No method awaits
//! while holding the lock.

use std::ops::Range;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::contract::model::User;
use crate::domain::repo::{InsertOutcome, UsersRepository};

#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Index range of `items[skip : skip + limit]` for a sequence of `len` items.
///
/// Negative bounds count from the end, both bounds are clamped into
/// `[0, len]` and an inverted range is empty.
pub fn slice_bounds(len: usize, skip: i64, limit: i64) -> Range<usize> {
    let len_i = len as i128;
    let clamp = |bound: i128| -> usize {
        let adjusted = if bound < 0 { bound + len_i } else { bound };
        adjusted.clamp(0, len_i) as usize
    };

    let start = clamp(i128::from(skip));
    let stop = clamp(i128::from(skip) + i128::from(limit));
    if stop <= start {
        start..start
    } else {
        start..stop
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn append(&self, user: User) -> anyhow::Result<()> {
        self.users.write().push(user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn slice(&self, skip: i64, limit: i64) -> anyhow::Result<Vec<User>> {
        let users = self.users.read();
        let range = slice_bounds(users.len(), skip, limit);
        Ok(users[range].to_vec())
    }

    async fn all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().clone())
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.users.read().len())
    }

    async fn insert_unique(&self, user: User, check_id: bool) -> anyhow::Result<InsertOutcome> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(InsertOutcome::DuplicateEmail);
        }
        if check_id && users.iter().any(|u| u.id == user.id) {
            return Ok(InsertOutcome::DuplicateId);
        }
        users.push(user);
        Ok(InsertOutcome::Inserted)
    }
}
