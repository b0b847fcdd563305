use thiserror::Error;

/// One rejected field of a creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("User with id {id} already exists")]
    IdAlreadyExists { id: i64 },

    #[error("Validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldViolation> },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

fn summarize(errors: &[FieldViolation]) -> String {
    errors
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: String) -> Self {
        Self::EmailAlreadyExists { email }
    }

    pub fn id_already_exists(id: i64) -> Self {
        Self::IdAlreadyExists { id }
    }

    pub fn validation(errors: Vec<FieldViolation>) -> Self {
        Self::Validation { errors }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
