//! Role hierarchy used for access decisions.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Fixed role set, ordered from most to least privileged.
///
/// `ReadOnly` is reserved: no current policy gate grants it anything beyond
/// what an unauthenticated caller gets, but it is a valid stored role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Superadmin,
    Admin,
    User,
    ReadOnly,
}

impl Role {
    /// Canonical wire/storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "SUPERADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::ReadOnly => "READ_ONLY",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPERADMIN" => Ok(Role::Superadmin),
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            "READ_ONLY" => Ok(Role::ReadOnly),
            other => Err(CoreError::validation(format!("unknown role: {other}"))),
        }
    }
}
