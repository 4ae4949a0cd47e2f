//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account. Owns and reports on its own transactions.
    #[default]
    User,
    /// Paying account with access to premium analytics.
    Premium,
    /// Administrator. May act on any transaction and list users.
    Admin,
}

impl Role {
    /// All roles, lowest privilege first.
    pub const ALL: [Self; 3] = [Self::User, Self::Premium, Self::Admin];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Premium => "premium",
            Self::Admin => "admin",
        }
    }

    /// Returns true if this role may act on records it does not own.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for role names that are not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "premium" => Ok(Self::Premium),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
