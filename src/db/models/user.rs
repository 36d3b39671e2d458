use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

/// Elevated roles a user can hold. A user with neither is a plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Email address, immutable once created.
    pub user_id: String,
    pub name: String,
    pub roles: Json<Vec<Role>>,
    pub team: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: String,
    pub updated_by: Option<String>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.0.contains(&role)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_id: String,
    pub name: String,
    /// Role names as submitted; validated against the closed set before use.
    #[serde(default)]
    pub roles: Vec<String>,
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoles {
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}
