use crate::contract::model::User;
use async_trait::async_trait;

/// Result of a guarded insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateEmail,
    DuplicateId,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Records keep insertion order; every lookup returns the first match.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Add a record at the end.
    async fn append(&self, user: User) -> anyhow::Result<()>;
    /// First record whose email equals `email` exactly.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// First record with the given id.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// `items[skip : skip + limit]` with sequence-slicing semantics.
    async fn slice(&self, skip: i64, limit: i64) -> anyhow::Result<Vec<User>>;
    /// Snapshot of every record.
    async fn all(&self) -> anyhow::Result<Vec<User>>;
    /// Number of records.
    async fn count(&self) -> anyhow::Result<usize>;

    /// Append unless the email (or, with `check_id`, the id) is taken.
    ///
    /// The default runs lookup and append as separate calls; adapters that can
    /// hold a lock across both should override it.
    async fn insert_unique(&self, user: User, check_id: bool) -> anyhow::Result<InsertOutcome> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Ok(InsertOutcome::DuplicateEmail);
        }
        if check_id && self.find_by_id(user.id).await?.is_some() {
            return Ok(InsertOutcome::DuplicateId);
        }
        self.append(user).await?;
        Ok(InsertOutcome::Inserted)
    }
}
