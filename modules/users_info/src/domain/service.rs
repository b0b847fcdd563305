use std::sync::Arc;

use crate::contract::model::{NewUser, User};
use crate::domain::error::{DomainError, FieldViolation};
use crate::domain::repo::{InsertOutcome, UsersRepository};
use tracing::{debug, info, instrument};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_MISSING_AT: &str = "Email must contain @";

/// Domain service with business rules for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_limit: i64,
    pub max_limit: Option<i64>,
    pub enforce_unique_ids: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: None,
            enforce_unique_ids: false,
        }
    }
}

/// Store contents as returned by the debug dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersDump {
    pub users_count: usize,
    pub users: Vec<User>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    /// List users in insertion order.
    ///
    /// `skip` defaults to 0 and `limit` to the configured default; both keep
    /// sequence-slicing semantics, so negative values never error. A configured
    /// `max_limit` caps `limit`.
    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(
        &self,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<User>, DomainError> {
        let skip = skip.unwrap_or(0);
        let mut limit = limit.unwrap_or(self.config.default_limit);
        if let Some(max) = self.config.max_limit {
            limit = limit.min(max);
        }
        debug!(skip, limit, "Listing users");

        let users = self
            .repo
            .slice(skip, limit)
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self),
        fields(user_id = new_user.id, email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validate_new_user(&new_user)?;

        let user = User::from(new_user);
        let outcome = self
            .repo
            .insert_unique(user.clone(), self.config.enforce_unique_ids)
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))?;

        match outcome {
            InsertOutcome::Inserted => {
                info!("Successfully created user with id={}", user.id);
                Ok(user)
            }
            InsertOutcome::DuplicateEmail => Err(DomainError::email_already_exists(user.email)),
            InsertOutcome::DuplicateId => Err(DomainError::id_already_exists(user.id)),
        }
    }

    #[instrument(name = "users_info.service.count_users", skip(self))]
    pub async fn count_users(&self) -> Result<usize, DomainError> {
        self.repo
            .count()
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))
    }

    /// Count and contents taken from one snapshot.
    #[instrument(name = "users_info.service.debug_dump", skip(self))]
    pub async fn debug_dump(&self) -> Result<UsersDump, DomainError> {
        let users = self
            .repo
            .all()
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))?;
        Ok(UsersDump {
            users_count: users.len(),
            users,
        })
    }

    /// Collects every violation instead of stopping at the first one.
    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if new_user.name.trim().is_empty() {
            errors.push(FieldViolation {
                field: "name",
                message: NAME_REQUIRED,
            });
        }
        if !new_user.email.contains('@') {
            errors.push(FieldViolation {
                field: "email",
                message: EMAIL_MISSING_AT,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(violations = errors.len(), "Rejected user payload");
            Err(DomainError::validation(errors))
        }
    }
}
