// src/models/auth.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned when a session carries none
pub const DEFAULT_ROLE: &str = "physician";

/// Caller role as carried by the session
/// Only `superadmin` has a meaning for photo access; every other role is
/// kept verbatim so it shows up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Superadmin,
    Other(String),
}

impl Role {
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Role::Superadmin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        // Exact match, the way the portal compares roles
        if value == "superadmin" {
            Role::Superadmin
        } else {
            Role::Other(value)
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller
/// DOCUMENTATION: Produced by the session layer and handed to handlers
/// explicitly; nothing reads caller identity from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }
}
