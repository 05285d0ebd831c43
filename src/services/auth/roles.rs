use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::services::auth::AuthError;

/// Identity class assigned to a user at creation and immutable afterwards.
///
/// The enum is closed: an unrecognized role string is rejected at the parse
/// boundary (`FromStr`), so nothing past that point can carry an unknown
/// role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// One permitted action on one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    OrderCreate,
    OrderRead,
    OrderUpdate,
    OrderCancel,
    ProductCreate,
    ProductRead,
    ProductUpdate,
    ProductDelete,
}

impl Capability {
    /// The full capability universe; access tokens carry an explicit flag
    /// for every entry.
    pub const ALL: [Capability; 8] = [
        Capability::OrderCreate,
        Capability::OrderRead,
        Capability::OrderUpdate,
        Capability::OrderCancel,
        Capability::ProductCreate,
        Capability::ProductRead,
        Capability::ProductUpdate,
        Capability::ProductDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::OrderCreate => "order:create",
            Capability::OrderRead => "order:read",
            Capability::OrderUpdate => "order:update",
            Capability::OrderCancel => "order:cancel",
            Capability::ProductCreate => "product:create",
            Capability::ProductRead => "product:read",
            Capability::ProductUpdate => "product:update",
            Capability::ProductDelete => "product:delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a role to the fixed set of capabilities it grants.
///
/// Total over the closed `Role` enum, deterministic, no fallback entry. A
/// new role must come with an explicit arm here.
pub fn capabilities_for(role: Role) -> &'static [Capability] {
    match role {
        Role::User => &[
            Capability::OrderCreate,
            Capability::OrderRead,
            Capability::OrderCancel,
        ],
        Role::Admin => &[
            Capability::ProductCreate,
            Capability::ProductRead,
            Capability::ProductUpdate,
            Capability::ProductDelete,
            Capability::OrderRead,
            Capability::OrderCreate,
            Capability::OrderUpdate,
            Capability::OrderCancel,
        ],
    }
}
