//! Caller identity and authorization policy
//!
//! Authentication happens upstream; the engine only receives an opaque
//! `(caller_id, role)` pair and decides whether the operation is allowed.
//! Denials are ordinary outcomes, logged at debug level.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{Error, Result};

/// Role granted by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Athlete,
    Anonymous,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "ATHLETE" => Some(Self::Athlete),
            "ANONYMOUS" => Some(Self::Anonymous),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "ADMIN",
            Self::Athlete => "ATHLETE",
            Self::Anonymous => "ANONYMOUS",
        };
        f.write_str(name)
    }
}

/// Identity of the party making a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn athlete(id: impl Into<String>) -> Self {
        Self::new(id, Role::Athlete)
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous", Role::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Allow administrators only
pub fn require_admin(caller: &Caller, operation: &str) -> Result<()> {
    if caller.is_admin() {
        return Ok(());
    }
    debug!(caller = %caller.id, role = %caller.role, operation, "Denied: admin required");
    Err(Error::Forbidden(format!("{} requires ADMIN", operation)))
}

/// Allow administrators and the athlete identified by `athlete_id`
pub fn require_admin_or_athlete(caller: &Caller, athlete_id: &str, operation: &str) -> Result<()> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::Athlete if caller.id == athlete_id => Ok(()),
        _ => {
            debug!(
                caller = %caller.id,
                role = %caller.role,
                athlete_id,
                operation,
                "Denied: admin or owning athlete required"
            );
            Err(Error::Forbidden(format!(
                "{} requires ADMIN or athlete {}",
                operation, athlete_id
            )))
        }
    }
}
