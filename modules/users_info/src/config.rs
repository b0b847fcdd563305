use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Page size for `GET /users` when `limit` is omitted.
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    /// Upper bound applied to `limit`. Unset means unbounded.
    #[serde(default)]
    pub max_limit: Option<i64>,
    /// Reject a creation whose id is already taken.
    #[serde(default)]
    pub enforce_unique_ids: bool,
    /// Mount `GET /debug/users`.
    #[serde(default = "default_expose_debug_routes")]
    pub expose_debug_routes: bool,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: None,
            enforce_unique_ids: false,
            expose_debug_routes: default_expose_debug_routes(),
        }
    }
}

fn default_limit() -> i64 {
    100
}

fn default_expose_debug_routes() -> bool {
    true
}
