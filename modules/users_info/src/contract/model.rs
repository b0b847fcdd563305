/// Pure user model for inter-module communication (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Data for creating a new user. The id is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<NewUser> for User {
    fn from(n: NewUser) -> Self {
        Self {
            id: n.id,
            name: n.name,
            email: n.email,
        }
    }
}
