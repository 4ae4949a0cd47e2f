//! Access control gate.
//!
//! Two independent rules decide every request:
//! - record access: the actor owns the record, or the actor is an admin;
//! - feature access: the actor's role is in the feature's permitted set.
//!
//! Both are pure functions of their inputs. A denial is an error value the
//! caller surfaces, never a narrowed view of the data.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tally_shared::{AppError, types::UserId};
use thiserror::Error;

use crate::auth::Role;

/// The authenticated principal making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User ID.
    pub id: UserId,
    /// Current role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// A role-gated capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Trend charts and the expense forecast.
    PremiumContent,
    /// The full user directory.
    AdminUsers,
}

impl Feature {
    /// Returns the feature name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PremiumContent => "premium-content",
            Self::AdminUsers => "admin-users",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access denials.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The actor neither owns the record nor is an admin.
    #[error("Not authorized")]
    NotOwner,

    /// The actor's role is not permitted to use the feature.
    #[error("User role '{role}' is not authorized to access this route")]
    RoleDenied {
        /// Role of the actor.
        role: Role,
        /// Feature that was requested.
        feature: Feature,
    },
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotOwner => Self::Unauthorized(err.to_string()),
            AccessError::RoleDenied { .. } => Self::Forbidden(err.to_string()),
        }
    }
}

/// Feature → permitted roles table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: HashMap<Feature, Vec<Role>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::empty()
            .with_rule(Feature::PremiumContent, &[Role::Premium, Role::Admin])
            .with_rule(Feature::AdminUsers, &[Role::Admin])
    }
}

impl AccessPolicy {
    /// Creates a policy that permits nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Replaces the permitted roles for a feature.
    #[must_use]
    pub fn with_rule(mut self, feature: Feature, roles: &[Role]) -> Self {
        self.rules.insert(feature, roles.to_vec());
        self
    }

    /// Returns the roles permitted to use a feature.
    #[must_use]
    pub fn permitted_roles(&self, feature: Feature) -> &[Role] {
        self.rules.get(&feature).map_or(&[], Vec::as_slice)
    }

    /// Returns true if the actor may use the feature.
    #[must_use]
    pub fn is_allowed(&self, actor: &Actor, feature: Feature) -> bool {
        self.permitted_roles(feature).contains(&actor.role)
    }

    /// Like [`is_allowed`](Self::is_allowed), as a `Result`.
    pub fn authorize(&self, actor: &Actor, feature: Feature) -> Result<(), AccessError> {
        if self.is_allowed(actor, feature) {
            Ok(())
        } else {
            Err(AccessError::RoleDenied {
                role: actor.role,
                feature,
            })
        }
    }
}

/// Returns true if the actor may read or change a record owned by `owner_id`.
#[must_use]
pub fn can_access_record(actor: &Actor, owner_id: UserId) -> bool {
    actor.id == owner_id || actor.role.is_admin()
}

/// Like [`can_access_record`], as a `Result`.
pub fn authorize_record(actor: &Actor, owner_id: UserId) -> Result<(), AccessError> {
    if can_access_record(actor, owner_id) {
        Ok(())
    } else {
        Err(AccessError::NotOwner)
    }
}
