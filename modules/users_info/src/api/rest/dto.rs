use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{NewUser, User};
use crate::domain::service::UsersDump;

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// REST DTO for creating a new user.
///
/// `name` and `email` may be absent on the wire; the domain validation then
/// reports them like empty values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// REST DTO for query parameters of `GET /users`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Number of users to skip (default 0).
    pub skip: Option<i64>,
    /// Maximum number of users to return (default 100).
    pub limit: Option<i64>,
}

/// Body of `GET /debug/users`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersDumpDto {
    pub users_count: usize,
    pub users: Vec<UserDto>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            id: req.id,
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
        }
    }
}

impl From<UsersDump> for UsersDumpDto {
    fn from(dump: UsersDump) -> Self {
        Self {
            users_count: dump.users_count,
            users: dump.users.into_iter().map(UserDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_become_empty_strings() {
        let req: CreateUserReq = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let new_user = NewUser::from(req);
        assert_eq!(new_user.id, 3);
        assert_eq!(new_user.name, "");
        assert_eq!(new_user.email, "");
    }

    #[test]
    fn name_is_not_trimmed() {
        let req: CreateUserReq =
            serde_json::from_str(r#"{"id": 1, "name": "  Ann ", "email": "a@x.com"}"#).unwrap();
        assert_eq!(NewUser::from(req).name, "  Ann ");
    }
}
