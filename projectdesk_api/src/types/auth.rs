use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login form payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The `data` of a successful login: a bearer token and an opaque user profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Value,
}
