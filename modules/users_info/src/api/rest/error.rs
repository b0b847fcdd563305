use axum::http::StatusCode;
use modkit::{unprocessable, Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

pub const CREATE_USER_FAILED: &str = "Failed to create user";
pub const LIST_USERS_FAILED: &str = "Failed to fetch users";
pub const GET_USER_FAILED: &str = "Failed to fetch user";
pub const USER_ALREADY_EXISTS: &str = "User already exists";
pub const USER_NOT_FOUND: &str = "User not found";

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse.
///
/// `internal_detail` is the fixed message for storage failures of the
/// calling operation; classified errors keep their own detail.
pub fn map_domain_error(e: &DomainError, instance: &str, internal_detail: &str) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "Not Found",
            USER_NOT_FOUND,
            instance,
        ),
        DomainError::EmailAlreadyExists { .. } | DomainError::IdAlreadyExists { .. } => {
            from_parts(
                StatusCode::BAD_REQUEST,
                "USERS_ALREADY_EXISTS",
                "Bad Request",
                USER_ALREADY_EXISTS,
                instance,
            )
        }
        DomainError::Validation { errors } => {
            let violations = errors
                .iter()
                .map(|v| ValidationError::new(format!("/{}", v.field), v.message))
                .collect();
            let mut resp = unprocessable(violations);
            resp.0 = resp.0.with_instance(instance);
            resp
        }
        DomainError::Storage { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "{}", internal_detail);
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal Server Error",
                internal_detail,
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::FieldViolation;

    #[test]
    fn duplicate_email_and_id_share_one_response() {
        for e in [
            DomainError::email_already_exists("a@x.com".into()),
            DomainError::id_already_exists(1),
        ] {
            let p = map_domain_error(&e, "/users", CREATE_USER_FAILED).0;
            assert_eq!(p.status, 400);
            assert_eq!(p.detail, "User already exists");
            assert_eq!(p.code, "USERS_ALREADY_EXISTS");
        }
    }

    #[test]
    fn storage_errors_use_operation_detail() {
        let e = DomainError::storage("disk on fire");
        let p = map_domain_error(&e, "/users", LIST_USERS_FAILED).0;
        assert_eq!(p.status, 500);
        assert_eq!(p.detail, "Failed to fetch users");
        assert!(!serde_json::to_string(&p).unwrap().contains("disk on fire"));
    }

    #[test]
    fn validation_points_at_fields() {
        let e = DomainError::validation(vec![FieldViolation {
            field: "email",
            message: "Email must contain @",
        }]);
        let p = map_domain_error(&e, "/users", CREATE_USER_FAILED).0;
        assert_eq!(p.status, 422);
        assert_eq!(p.instance, "/users");
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].pointer, "/email");
        assert_eq!(errors[0].detail, "Email must contain @");
    }
}
