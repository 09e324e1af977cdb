//! Acting user identity.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May read and mutate any budget
    Admin,
    /// Trainer; owns private budgets
    User,
    /// Trainee account
    Trainee,
}

impl Role {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Trainee => "trainee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "trainee" => Ok(Self::Trainee),
            other => Err(Error::Config {
                message: format!("Unknown role: {other}"),
            }),
        }
    }
}

/// The user on whose behalf an operation runs. Stamped on created rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Opaque user id
    pub user_id: String,
    /// Role used for budget authorization
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether the actor has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Trainee ".parse::<Role>().unwrap(), Role::Trainee);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!(matches!("coach".parse::<Role>(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_is_admin() {
        assert!(Actor::new("root", Role::Admin).is_admin());
        assert!(!Actor::new("trainer-1", Role::User).is_admin());
    }
}
