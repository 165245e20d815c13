//! User accounts and role checks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Access role. Administrators implicitly hold every other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Operator,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Operator => "operator",
            Role::Administrator => "administrator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "operator" => Ok(Role::Operator),
            "administrator" => Ok(Role::Administrator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Account record. The password hash never leaves the db layer; API
/// responses carry this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Hex-encoded SHA-256 of the password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check whether `role` satisfies `required`.
pub fn authorize(role: Role, required: Role) -> bool {
    role == required || role == Role::Administrator
}
